//! The seam between the pipeline and the page it runs in.
//!
//! The browser implementation lives in `reskin-web`; tests supply their
//! own doubles. Both traits take `&self` everywhere: handles are shared
//! between interleaved per-element tasks on a single thread, so any
//! mutable state sits behind interior mutability.

use crate::swap::SwapPlan;
use crate::types::{ImageSnapshot, ImageState, ReskinError, RgbaImage, Viewport};

/// A live image element on the page.
#[allow(async_fn_in_trait)]
pub trait PageImage {
    /// Capture everything the classifier reads, as of now.
    fn snapshot(&self) -> ImageSnapshot;

    /// The progress marker stored on the element.
    fn state(&self) -> ImageState;

    /// Overwrite the progress marker.
    fn set_state(&self, state: ImageState);

    /// Whether the element has finished loading with a non-zero natural size.
    fn is_decoded(&self) -> bool;

    /// Resolve once the element fires `load` or `error`, whichever is first.
    ///
    /// May never resolve; the pipeline does not time out.
    async fn decoded(&self);

    /// Apply a swap: source, `srcset`, `sizes` removal, pinned box, fit,
    /// and the faded-out starting state of the transition.
    fn apply(&self, plan: &SwapPlan);

    /// Set the element's `opacity`.
    fn set_opacity(&self, opacity: f64);
}

/// Services the page provides to the pipeline.
#[allow(async_fn_in_trait)]
pub trait Host {
    type Image: PageImage;

    /// Current layout viewport.
    fn viewport(&self) -> Viewport;

    /// Origin of the proxy serving the page, without a trailing slash.
    fn origin(&self) -> String;

    /// Load `url` and read back its pixels at natural size.
    ///
    /// # Errors
    ///
    /// Any load, decode, or read-back failure.
    async fn load_pixels(&self, url: &str) -> Result<RgbaImage, ReskinError>;

    /// Load and decode `url` off-DOM.
    ///
    /// # Errors
    ///
    /// The resource failed to load or decode.
    async fn preload(&self, url: &str) -> Result<(), ReskinError>;

    /// Wait `ms` milliseconds.
    async fn sleep(&self, ms: u32);
}

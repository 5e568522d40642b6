//! [`Host`] over the browser window.

use gloo_timers::future::TimeoutFuture;
use reskin_pipeline::{Host, ReskinError, RgbaImage, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, Window};

use crate::dom::DomImage;
use crate::error::WebError;
use crate::event;

/// The current window and document.
pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    /// # Errors
    ///
    /// Returns [`WebError::NoWindow`] outside a window context.
    pub fn new() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoWindow)?;
        Ok(Self { window, document })
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Load `url` into a detached image element.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    async fn load_image(url: &str, cross_origin: bool) -> Result<HtmlImageElement, WebError> {
        let img = HtmlImageElement::new()?;
        if cross_origin {
            img.set_cross_origin(Some("anonymous"));
        }
        event::first_of(&img, &["load"], &["error"], || {
            img.set_src(url);
            Ok(())
        })
        .await
        .map_err(|_| WebError::Load(url.to_owned()))?;
        Ok(img)
    }

    /// Draw `url` onto a canvas at natural size and read the pixels back.
    ///
    /// A cross-origin image taints the canvas and `getImageData` throws.
    #[allow(clippy::future_not_send)]
    async fn read_pixels(&self, url: &str) -> Result<RgbaImage, WebError> {
        let img = Self::load_image(url, true).await?;
        let (width, height) = (img.natural_width(), img.natural_height());
        if width == 0 || height == 0 {
            return Err(WebError::Empty(url.to_owned()));
        }

        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| WebError::JsError("created element is not a canvas".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or(WebError::NoContext)?
            .dyn_into()
            .map_err(|_| WebError::NoContext)?;

        ctx.draw_image_with_html_image_element(&img, 0.0, 0.0)?;
        let data = ctx.get_image_data(0.0, 0.0, f64::from(width), f64::from(height))?;
        RgbaImage::from_raw(width, height, data.data().0).ok_or_else(|| WebError::Empty(url.to_owned()))
    }
}

impl Host for WebHost {
    type Image = DomImage;

    fn viewport(&self) -> Viewport {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or_default();
        Viewport::new(dim(self.window.inner_width()), dim(self.window.inner_height()))
    }

    fn origin(&self) -> String {
        self.window.location().origin().unwrap_or_default()
    }

    async fn load_pixels(&self, url: &str) -> Result<RgbaImage, ReskinError> {
        self.read_pixels(url).await.map_err(Into::into)
    }

    async fn preload(&self, url: &str) -> Result<(), ReskinError> {
        Self::load_image(url, false).await?;
        Ok(())
    }

    async fn sleep(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }
}

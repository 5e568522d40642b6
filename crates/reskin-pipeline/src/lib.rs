//! reskin-pipeline: Image classification and replacement core (sans-IO).
//!
//! Decides which images on a page are large display images, checks
//! whether their pixels carry material transparency, picks a replacement
//! from a fixed catalog while avoiding recent repeats, and plans the swap:
//!
//! classify -> detect transparency -> select -> preload -> swap -> fade in.
//!
//! This crate has **no browser dependencies** -- the page is reached
//! through the [`Host`] and [`PageImage`] traits. The `web-sys`
//! implementation lives in `reskin-web`.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod host;
pub mod lineage;
pub mod pipeline;
pub mod recency;
pub mod select;
pub mod srcset;
pub mod swap;
pub mod transparency;
pub mod types;

pub use catalog::Catalog;
pub use classify::{Classification, RejectReason, ScoreBreakdown, classify};
pub use config::ReplacerConfig;
pub use host::{Host, PageImage};
pub use pipeline::{Outcome, Replacer};
pub use recency::RecencyWindow;
pub use select::{CategorySelector, Selection};
pub use swap::{ObjectFit, SwapPlan};
pub use transparency::{AlphaHistogram, has_transparency};
pub use types::{
    Bounds, Category, DeclaredSize, ElementNode, ImageSnapshot, ImageState, Offsets, Positioning,
    ReskinError, RgbaImage, Viewport,
};

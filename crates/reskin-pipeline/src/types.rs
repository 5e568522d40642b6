//! Shared types for the reskin classification pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so host crates can hand decoded pixel surfaces
/// to the detector without depending on `image` directly.
pub use image::RgbaImage;

/// An axis-aligned box in CSS pixels, as reported by layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge relative to the viewport.
    pub x: f64,
    /// Top edge relative to the viewport.
    pub y: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl Bounds {
    /// Create a box anchored at the origin.
    #[must_use]
    pub const fn sized(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// `width / height`.
    ///
    /// A zero height yields an infinite (or NaN for a 0×0 box) ratio;
    /// every comparison in the pipeline treats those the same way the
    /// browser arithmetic would.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// The size of the layout viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// `window.innerWidth`.
    pub width: f64,
    /// `window.innerHeight`.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport of the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

/// Computed CSS `position` of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Positioning {
    /// Parse a computed `position` value. Unknown keywords map to `Static`.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            "sticky" => Self::Sticky,
            _ => Self::Static,
        }
    }

    /// Whether the element is taken out of normal flow and pinned by offsets.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// Computed `top`/`right`/`bottom`/`left` offsets in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offsets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Offsets {
    /// Build offsets from computed style strings such as `"12px"` or `"auto"`.
    ///
    /// Values are read with integer-prefix semantics; anything without a
    /// leading number counts as 0.
    #[must_use]
    pub fn from_css(top: &str, right: &str, bottom: &str, left: &str) -> Self {
        Self {
            top: css_int(top),
            right: css_int(right),
            bottom: css_int(bottom),
            left: css_int(left),
        }
    }
}

/// Read the leading integer of a CSS length (`"42.7px"` → 42, `"auto"` → 0).
#[must_use]
pub fn css_int(value: &str) -> f64 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = digits[..end]
        .bytes()
        .fold(0.0_f64, |acc, b| acc.mul_add(10.0, f64::from(b - b'0')));
    if negative { -magnitude } else { magnitude }
}

/// One entry of an element's lineage: the tag, raw `class` attribute,
/// and `role` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementNode {
    /// Lower-case tag name.
    pub tag: String,
    /// The raw `class` attribute, whitespace separated.
    pub class: String,
    /// The `role` attribute, if present.
    pub role: Option<String>,
}

impl ElementNode {
    /// A node with the given tag and no classes.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            class: String::new(),
            role: None,
        }
    }

    /// Builder: set the raw `class` attribute.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.class = class.to_owned();
        self
    }

    /// Builder: set the `role` attribute.
    #[must_use]
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_owned());
        self
    }

    /// Iterate the individual class names.
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.class.split_ascii_whitespace()
    }
}

/// Author-declared size for one axis, captured before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeclaredSize {
    /// Inline `style.width` / `style.height`, if non-empty.
    pub style: Option<String>,
    /// The `width` / `height` attribute, if present.
    pub attribute: Option<String>,
}

/// Everything the classifier and selector read from a live image element,
/// captured at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSnapshot {
    /// `getBoundingClientRect()` of the element.
    pub bounds: Bounds,
    /// Resolved `src`.
    pub src: String,
    /// The `srcset` attribute, if present and non-empty.
    pub srcset: Option<String>,
    /// Whether a `sizes` attribute is present.
    pub has_sizes: bool,
    /// Computed `position`.
    pub positioning: Positioning,
    /// Computed offsets.
    pub offsets: Offsets,
    /// The element itself followed by its ancestors, innermost first.
    pub lineage: Vec<ElementNode>,
    /// Bounding box of the direct parent element, if any.
    pub parent_bounds: Option<Bounds>,
    /// Declared width.
    pub declared_width: DeclaredSize,
    /// Declared height.
    pub declared_height: DeclaredSize,
}

impl ImageSnapshot {
    /// A minimal snapshot for an `<img>` of the given rendered size.
    #[must_use]
    pub fn new(src: &str, width: f64, height: f64) -> Self {
        Self {
            bounds: Bounds::sized(width, height),
            src: src.to_owned(),
            lineage: vec![ElementNode::new("img")],
            ..Self::default()
        }
    }

    /// Builder: append an ancestor (outermost last).
    #[must_use]
    pub fn within(mut self, ancestor: ElementNode) -> Self {
        self.lineage.push(ancestor);
        self
    }

    /// Builder: set the `srcset` attribute.
    #[must_use]
    pub fn with_srcset(mut self, srcset: &str) -> Self {
        self.srcset = Some(srcset.to_owned());
        self
    }

    /// Builder: mark the element as carrying a `sizes` attribute.
    #[must_use]
    pub const fn with_sizes(mut self) -> Self {
        self.has_sizes = true;
        self
    }

    /// Builder: set the positioning scheme and offsets.
    #[must_use]
    pub fn positioned(mut self, positioning: Positioning, offsets: Offsets) -> Self {
        self.positioning = positioning;
        self.offsets = offsets;
        self
    }

    /// Builder: set the parent element's box.
    #[must_use]
    pub fn with_parent_bounds(mut self, bounds: Bounds) -> Self {
        self.parent_bounds = Some(bounds);
        self
    }
}

/// One of the four replacement partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wide,
    Tall,
    Square,
    Transparent,
}

impl Category {
    /// All categories in catalog order.
    pub const ALL: [Self; 4] = [Self::Wide, Self::Tall, Self::Square, Self::Transparent];

    /// The directory name used in replacement paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wide => "wide",
            Self::Tall => "tall",
            Self::Square => "square",
            Self::Transparent => "transparent",
        }
    }

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Wide => 0,
            Self::Tall => 1,
            Self::Square => 2,
            Self::Transparent => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-element progress marker.
///
/// `Evaluated` is terminal: the pipeline never revisits such an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageState {
    #[default]
    Unseen,
    AwaitingDecode,
    Evaluated,
}

impl ImageState {
    /// Marker value stored on the element (`data-proxy-processed`).
    #[must_use]
    pub const fn marker(self) -> Option<&'static str> {
        match self {
            Self::Unseen => None,
            Self::AwaitingDecode => Some("pending"),
            Self::Evaluated => Some("true"),
        }
    }

    /// Inverse of [`marker`](Self::marker).
    #[must_use]
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            None => Self::Unseen,
            Some("pending") => Self::AwaitingDecode,
            Some(_) => Self::Evaluated,
        }
    }
}

/// Errors raised inside the pipeline.
///
/// None of these reach the page: the detector folds them into a `false`
/// verdict and the executor skips the swap.
#[derive(Debug, thiserror::Error)]
pub enum ReskinError {
    /// The image source produced no bytes.
    #[error("image data is empty")]
    EmptyInput,

    /// Failed to decode the image bytes.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// A `data:` URL could not be parsed or its payload decoded.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The replacement catalog violates its construction invariants.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The host environment (browser or test double) reported a failure.
    #[error("host error: {0}")]
    Host(String),
}

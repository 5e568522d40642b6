//! Planning the mutation that swaps an image for its replacement.
//!
//! The plan is pure data; the host applies it to the element only after
//! the target has preloaded.

use serde::Serialize;

use crate::select::Selection;
use crate::srcset;
use crate::types::{Category, DeclaredSize, ImageSnapshot};

/// Delay between fading out and fading back in.
pub const FADE_DELAY_MS: u32 = 100;

/// CSS `transition` applied to a swapped image.
pub const FADE_TRANSITION: &str = "opacity 0.3s ease";

/// CSS `object-position` applied to a swapped image.
pub const OBJECT_POSITION: &str = "center";

/// CSS `object-fit` of a swapped image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    /// Letterbox; used for transparent replacements so the cut-out stays whole.
    Contain,
    /// Crop to fill.
    Cover,
}

impl ObjectFit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contain => "contain",
            Self::Cover => "cover",
        }
    }
}

/// Everything the host writes to an element when swapping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapPlan {
    /// New `src`.
    pub src: String,
    /// New `srcset`, present only if the element had one.
    pub srcset: Option<String>,
    /// Drop the element's `sizes`; it described the old candidates.
    pub remove_sizes: bool,
    /// Pinned `style.width`.
    pub width: String,
    /// Pinned `style.height`.
    pub height: String,
    pub object_fit: ObjectFit,
    pub object_position: &'static str,
    pub transition: &'static str,
}

impl SwapPlan {
    /// Plan the swap of the element captured in `snapshot` for `selection`.
    #[must_use]
    pub fn new(snapshot: &ImageSnapshot, selection: &Selection, image_folder: &str) -> Self {
        let src = selection.path(image_folder);
        let srcset = snapshot
            .srcset
            .as_deref()
            .map(|existing| srcset::rewrite(existing, &src));
        let object_fit = if selection.category == Category::Transparent {
            ObjectFit::Contain
        } else {
            ObjectFit::Cover
        };

        Self {
            srcset,
            remove_sizes: snapshot.has_sizes,
            width: pinned_dimension(&snapshot.declared_width, snapshot.bounds.width),
            height: pinned_dimension(&snapshot.declared_height, snapshot.bounds.height),
            object_fit,
            object_position: OBJECT_POSITION,
            transition: FADE_TRANSITION,
            src,
        }
    }
}

/// The CSS length that keeps one axis of the box at its original size.
///
/// Inline style wins, then the attribute (a bare number gets `px`), then
/// the rendered size.
#[must_use]
pub fn pinned_dimension(declared: &DeclaredSize, rendered: f64) -> String {
    if let Some(style) = declared.style.as_deref().filter(|s| !s.trim().is_empty()) {
        return style.to_owned();
    }
    if let Some(attr) = declared.attribute.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return if attr.parse::<f64>().is_ok() {
            format!("{attr}px")
        } else {
            attr.to_owned()
        };
    }
    format!("{rendered}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(category: Category, filename: &str) -> Selection {
        Selection {
            category,
            filename: filename.to_owned(),
        }
    }

    #[test]
    fn inline_style_wins() {
        let declared = DeclaredSize {
            style: Some("50%".into()),
            attribute: Some("300".into()),
        };
        assert_eq!(pinned_dimension(&declared, 120.0), "50%");
    }

    #[test]
    fn bare_attribute_gets_px() {
        let declared = DeclaredSize {
            style: None,
            attribute: Some("300".into()),
        };
        assert_eq!(pinned_dimension(&declared, 120.0), "300px");
    }

    #[test]
    fn attribute_with_unit_is_kept() {
        let declared = DeclaredSize {
            style: Some(String::new()),
            attribute: Some("20em".into()),
        };
        assert_eq!(pinned_dimension(&declared, 120.0), "20em");
    }

    #[test]
    fn falls_back_to_rendered_size() {
        assert_eq!(pinned_dimension(&DeclaredSize::default(), 300.0), "300px");
        assert_eq!(pinned_dimension(&DeclaredSize::default(), 212.5), "212.5px");
    }

    #[test]
    fn plan_for_square_with_srcset() {
        let snap = ImageSnapshot::new("/a.com/p.jpg", 300.0, 300.0)
            .with_srcset("/a.com/p.jpg 1x, /a.com/p@2x.jpg 2x");
        let plan = SwapPlan::new(&snap, &selection(Category::Square, "deadpool-3.jpg"), "/images/");
        assert_eq!(plan.src, "/images/square/deadpool-3.jpg");
        assert_eq!(
            plan.srcset.as_deref(),
            Some("/images/square/deadpool-3.jpg 1x, /images/square/deadpool-3.jpg 2x")
        );
        assert_eq!(plan.width, "300px");
        assert_eq!(plan.height, "300px");
        assert_eq!(plan.object_fit, ObjectFit::Cover);
        assert_eq!(plan.object_position, "center");
        assert_eq!(plan.transition, "opacity 0.3s ease");
        assert!(!plan.remove_sizes);
    }

    #[test]
    fn sizes_is_dropped_only_when_present() {
        let snap = ImageSnapshot::new("/a.com/p.jpg", 600.0, 300.0)
            .with_srcset("/a.com/p-600.jpg 600w, /a.com/p-1200.jpg 1200w")
            .with_sizes();
        let plan = SwapPlan::new(&snap, &selection(Category::Wide, "deadpool-1.jpg"), "/images/");
        assert!(plan.remove_sizes);
        assert_eq!(
            plan.srcset.as_deref(),
            Some("/images/wide/deadpool-1.jpg 600w, /images/wide/deadpool-1.jpg 1200w")
        );
    }

    #[test]
    fn transparent_plan_uses_contain_and_no_srcset() {
        let snap = ImageSnapshot::new("/logo.png", 200.0, 100.0);
        let plan = SwapPlan::new(
            &snap,
            &selection(Category::Transparent, "deadpool-9.png"),
            "/skins/",
        );
        assert_eq!(plan.src, "/skins/transparent/deadpool-9.png");
        assert_eq!(plan.srcset, None);
        assert_eq!(plan.object_fit, ObjectFit::Contain);
        assert_eq!(plan.object_fit.as_str(), "contain");
    }
}

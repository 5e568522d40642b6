//! Layout classification: is this a "large display image"?
//!
//! Classification runs in two phases:
//!
//! 1. **Hard rejects** that short-circuit regardless of score -- too
//!    small, UI-asset URL, inside page chrome, or pinned into a top
//!    corner of the viewport.
//! 2. **Scoring**: independent signed contributions from size, aspect
//!    ratio, content context, viewport-relative size and URL hints. The
//!    image is eligible when the total reaches the configured minimum.
//!
//! Classification is pure: the same snapshot, viewport and config always
//! produce the same [`Classification`]. Only the viewport terms depend on
//! the window size at evaluation time, which is why the pipeline never
//! re-evaluates an element.

use serde::Serialize;

use crate::config::ReplacerConfig;
use crate::lineage::{self, CHROME, CONTENT};
use crate::types::{ImageSnapshot, Viewport};

/// Images narrower or shorter than this are never content, whatever the
/// configured minimum.
pub const ABSOLUTE_MIN_SIZE: f64 = 40.0;

/// Out-of-flow elements whose offsets put them within this many pixels
/// of a top corner are treated as chrome.
pub const CORNER_DISTANCE: f64 = 100.0;

/// URL fragments that identify interface assets rather than content.
pub const UI_PATH_FRAGMENTS: &[&str] = &[
    "/icon", "/logo", "/sprite", "/ui/", "/nav", "/menu", "/btn", "/button",
];

/// Raster extensions that earn a small score boost.
const RASTER_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// Why an image was rejected before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Below the configured `min_width` / `min_height`.
    BelowMinimumSize,
    /// Below [`ABSOLUTE_MIN_SIZE`] on either axis.
    BelowAbsoluteFloor,
    /// The source URL contains a UI-asset fragment.
    UiAssetPath { fragment: &'static str },
    /// The element sits inside a header, nav, or menu.
    ChromeAncestor { tag: String },
    /// Fixed or absolute and anchored near the top-left or top-right corner.
    CornerAnchored,
}

/// Per-signal contributions to the classification score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    /// +3 / +2 / +1 by size tier.
    pub size_tier: i32,
    /// +2 for content-like ratios, +1 for square-ish.
    pub aspect: i32,
    /// +2 inside a main-content region.
    pub content_context: i32,
    /// +2 when large relative to the viewport.
    pub viewport_relative: i32,
    /// +1 for a raster file extension.
    pub extension: i32,
    /// -1 for SVG sources.
    pub vector_penalty: i32,
}

impl ScoreBreakdown {
    /// Sum of all contributions.
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.size_tier
            + self.aspect
            + self.content_context
            + self.viewport_relative
            + self.extension
            + self.vector_penalty
    }
}

/// The classifier's decision for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    /// A hard reject fired; no score was computed.
    Rejected { reason: RejectReason },
    /// The image was scored against `min_score`.
    Scored {
        score: ScoreBreakdown,
        total: i32,
        min_score: i32,
    },
}

impl Classification {
    /// Whether the image should be replaced.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        match self {
            Self::Rejected { .. } => false,
            Self::Scored {
                total, min_score, ..
            } => *total >= *min_score,
        }
    }
}

/// Classify a rendered image.
#[must_use]
pub fn classify(
    snapshot: &ImageSnapshot,
    viewport: Viewport,
    config: &ReplacerConfig,
) -> Classification {
    if let Some(reason) = hard_reject(snapshot, config) {
        return Classification::Rejected { reason };
    }
    let score = score(snapshot, viewport);
    Classification::Scored {
        total: score.total(),
        score,
        min_score: config.min_score,
    }
}

/// Evaluate the hard-reject filters in order.
#[must_use]
pub fn hard_reject(snapshot: &ImageSnapshot, config: &ReplacerConfig) -> Option<RejectReason> {
    let b = snapshot.bounds;

    if b.width < f64::from(config.min_width) || b.height < f64::from(config.min_height) {
        return Some(RejectReason::BelowMinimumSize);
    }
    if b.width < ABSOLUTE_MIN_SIZE || b.height < ABSOLUTE_MIN_SIZE {
        return Some(RejectReason::BelowAbsoluteFloor);
    }

    let src = snapshot.src.to_ascii_lowercase();
    if let Some(fragment) = UI_PATH_FRAGMENTS.iter().copied().find(|f| src.contains(f)) {
        return Some(RejectReason::UiAssetPath { fragment });
    }

    if let Some(node) = lineage::closest(&snapshot.lineage, CHROME) {
        return Some(RejectReason::ChromeAncestor {
            tag: node.tag.clone(),
        });
    }

    if snapshot.positioning.is_out_of_flow() {
        let o = snapshot.offsets;
        let near_top = o.top < CORNER_DISTANCE;
        if near_top && (o.left < CORNER_DISTANCE || o.right < CORNER_DISTANCE) {
            return Some(RejectReason::CornerAnchored);
        }
    }

    None
}

/// Compute the score contributions for an image that passed the hard rejects.
#[must_use]
pub fn score(snapshot: &ImageSnapshot, viewport: Viewport) -> ScoreBreakdown {
    let b = snapshot.bounds;
    let src = snapshot.src.to_ascii_lowercase();

    let size_tier = if b.width >= 200.0 && b.height >= 200.0 {
        3
    } else if b.width >= 150.0 && b.height >= 150.0 {
        2
    } else {
        1
    };

    let ratio = b.aspect_ratio();
    let aspect = if (1.2..=3.0).contains(&ratio) {
        2
    } else if (0.8..=1.2).contains(&ratio) {
        1
    } else {
        0
    };

    let content_context = if lineage::closest(&snapshot.lineage, CONTENT).is_some() {
        2
    } else {
        0
    };

    let viewport_relative =
        if b.width > viewport.width * 0.3 || b.height > viewport.height * 0.2 {
            2
        } else {
            0
        };

    let path = strip_query_and_fragment(&src);
    let extension = i32::from(RASTER_EXTENSIONS.iter().any(|ext| path.ends_with(ext)));

    let vector_penalty = if src.contains(".svg") { -1 } else { 0 };

    ScoreBreakdown {
        size_tier,
        aspect,
        content_context,
        viewport_relative,
        extension,
        vector_penalty,
    }
}

fn strip_query_and_fragment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{Bounds, ElementNode, Offsets, Positioning};

    const VIEWPORT: Viewport = Viewport::new(1920.0, 1080.0);

    fn default_config() -> ReplacerConfig {
        ReplacerConfig::default()
    }

    fn scored_total(c: &Classification) -> Option<i32> {
        match c {
            Classification::Scored { total, .. } => Some(*total),
            Classification::Rejected { .. } => None,
        }
    }

    #[test]
    fn article_square_scenario_scores_nine() {
        let snap = ImageSnapshot::new("https://proxy.test/site.com/photo.jpg", 300.0, 300.0)
            .within(ElementNode::new("article"));
        let c = classify(&snap, VIEWPORT, &default_config());
        let Classification::Scored { score, total, .. } = c else {
            panic!("expected a scored classification, got {c:?}");
        };
        assert_eq!(score.size_tier, 3);
        assert_eq!(score.aspect, 1);
        assert_eq!(score.content_context, 2);
        // 300 > 0.2 * 1080
        assert_eq!(score.viewport_relative, 2);
        assert_eq!(score.extension, 1);
        assert_eq!(score.vector_penalty, 0);
        assert_eq!(total, 9);
        assert!(c.is_eligible());
    }

    #[test]
    fn article_square_below_viewport_share_scores_seven() {
        let snap = ImageSnapshot::new("https://proxy.test/site.com/photo.jpg", 200.0, 200.0)
            .within(ElementNode::new("article"));
        let c = classify(&snap, VIEWPORT, &default_config());
        let Classification::Scored { score, total, .. } = c else {
            panic!("expected a scored classification, got {c:?}");
        };
        assert_eq!(score.size_tier, 3);
        assert_eq!(score.aspect, 1);
        assert_eq!(score.content_context, 2);
        assert_eq!(score.viewport_relative, 0);
        assert_eq!(score.extension, 1);
        assert_eq!(total, 7);
    }

    #[test]
    fn small_png_scores_exactly_three() {
        let snap = ImageSnapshot::new("/img/thing.png", 130.0, 130.0);
        let c = classify(&snap, VIEWPORT, &default_config());
        assert_eq!(scored_total(&c), Some(3));
        assert!(c.is_eligible());

        let strict = ReplacerConfig {
            min_score: 4,
            ..ReplacerConfig::default()
        };
        assert!(!classify(&snap, VIEWPORT, &strict).is_eligible());
    }

    #[test]
    fn absolute_floor_rejects_even_with_zero_minimums() {
        let config = ReplacerConfig {
            min_width: 0,
            min_height: 0,
            min_score: -100,
            ..ReplacerConfig::default()
        };
        for (w, h) in [(39.0, 500.0), (500.0, 39.0), (10.0, 10.0)] {
            let snap = ImageSnapshot::new("/hero.jpg", w, h).within(ElementNode::new("main"));
            assert_eq!(
                hard_reject(&snap, &config),
                Some(RejectReason::BelowAbsoluteFloor),
                "{w}x{h} should hit the absolute floor",
            );
            assert!(!classify(&snap, VIEWPORT, &config).is_eligible());
        }
    }

    #[test]
    fn configured_minimum_size_rejects_first() {
        let snap = ImageSnapshot::new("/a.jpg", 119.0, 400.0);
        assert_eq!(
            hard_reject(&snap, &default_config()),
            Some(RejectReason::BelowMinimumSize),
        );
        assert_eq!(hard_reject(&snap, &ReplacerConfig::aggressive()), None);
    }

    #[test]
    fn ui_path_rejects_despite_high_score() {
        let snap = ImageSnapshot::new("https://x.test/static/LOGO/big.jpg", 900.0, 400.0)
            .within(ElementNode::new("main"));
        assert_eq!(
            hard_reject(&snap, &default_config()),
            Some(RejectReason::UiAssetPath { fragment: "/logo" }),
        );
        assert!(!classify(&snap, VIEWPORT, &default_config()).is_eligible());
    }

    #[test]
    fn chrome_ancestor_rejects_despite_high_score() {
        let snap = ImageSnapshot::new("/photos/a.jpg", 900.0, 400.0)
            .within(ElementNode::new("div").with_class("navbar dark"))
            .within(ElementNode::new("main"));
        let c = classify(&snap, VIEWPORT, &default_config());
        assert_eq!(
            c,
            Classification::Rejected {
                reason: RejectReason::ChromeAncestor { tag: "div".into() }
            }
        );
    }

    #[test]
    fn corner_anchored_fixed_rejects() {
        let snap = ImageSnapshot::new("/photos/a.jpg", 900.0, 400.0).positioned(
            Positioning::Fixed,
            Offsets::from_css("10px", "auto", "auto", "auto"),
        );
        assert_eq!(
            hard_reject(&snap, &default_config()),
            Some(RejectReason::CornerAnchored),
        );
    }

    #[test]
    fn top_right_absolute_rejects() {
        let snap = ImageSnapshot::new("/photos/a.jpg", 300.0, 300.0).positioned(
            Positioning::Absolute,
            Offsets {
                top: 20.0,
                right: 5.0,
                bottom: 0.0,
                left: 900.0,
            },
        );
        assert_eq!(
            hard_reject(&snap, &default_config()),
            Some(RejectReason::CornerAnchored),
        );
    }

    #[test]
    fn out_of_flow_far_from_top_is_kept() {
        let snap = ImageSnapshot::new("/photos/a.jpg", 300.0, 300.0).positioned(
            Positioning::Absolute,
            Offsets {
                top: 400.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            },
        );
        assert_eq!(hard_reject(&snap, &default_config()), None);
    }

    #[test]
    fn relative_position_ignores_offsets() {
        let snap = ImageSnapshot::new("/photos/a.jpg", 300.0, 300.0)
            .positioned(Positioning::Relative, Offsets::default());
        assert_eq!(hard_reject(&snap, &default_config()), None);
    }

    #[test]
    fn size_tiers() {
        let tier = |w, h| score(&ImageSnapshot::new("/x", w, h), VIEWPORT).size_tier;
        assert_eq!(tier(200.0, 200.0), 3);
        assert_eq!(tier(199.0, 400.0), 2);
        assert_eq!(tier(150.0, 150.0), 2);
        assert_eq!(tier(149.0, 300.0), 1);
    }

    #[test]
    fn aspect_tiers() {
        let aspect = |w, h| score(&ImageSnapshot::new("/x", w, h), VIEWPORT).aspect;
        assert_eq!(aspect(300.0, 250.0), 2); // 1.2 exactly
        assert_eq!(aspect(600.0, 200.0), 2); // 3.0 exactly
        assert_eq!(aspect(620.0, 200.0), 0);
        assert_eq!(aspect(200.0, 250.0), 1); // 0.8 exactly
        assert_eq!(aspect(200.0, 400.0), 0);
    }

    #[test]
    fn viewport_relative_uses_either_axis() {
        let v = Viewport::new(1000.0, 1000.0);
        assert_eq!(
            score(&ImageSnapshot::new("/x", 301.0, 50.0), v).viewport_relative,
            2
        );
        assert_eq!(
            score(&ImageSnapshot::new("/x", 50.0, 201.0), v).viewport_relative,
            2
        );
        assert_eq!(
            score(&ImageSnapshot::new("/x", 300.0, 200.0), v).viewport_relative,
            0
        );
    }

    #[test]
    fn extension_hint_ignores_query_and_case() {
        let ext = |src| score(&ImageSnapshot::new(src, 300.0, 300.0), VIEWPORT).extension;
        assert_eq!(ext("/a/PHOTO.JPEG"), 1);
        assert_eq!(ext("/a/photo.webp?w=300"), 1);
        assert_eq!(ext("/a/photo.gif"), 0);
        assert_eq!(ext("/a/photo"), 0);
    }

    #[test]
    fn svg_penalty() {
        let s = score(&ImageSnapshot::new("/a/diagram.svg", 300.0, 300.0), VIEWPORT);
        assert_eq!(s.vector_penalty, -1);
        assert_eq!(s.extension, 0);
    }

    #[test]
    fn role_main_counts_as_content() {
        let snap = ImageSnapshot::new("/x", 300.0, 300.0)
            .within(ElementNode::new("div").with_role("main"));
        assert_eq!(score(&snap, VIEWPORT).content_context, 2);
    }

    #[test]
    fn narrow_image_below_threshold_is_ineligible() {
        // 130x300 tall gif outside content: 1 + 0 + 0 + 2 (300 > 216) + 0 = 3.
        let snap = ImageSnapshot::new("/x.gif", 130.0, 300.0);
        assert_eq!(scored_total(&classify(&snap, VIEWPORT, &default_config())), Some(3));
        // Same image in a larger viewport loses the viewport bonus.
        let big = Viewport::new(3840.0, 2160.0);
        let c = classify(&snap, big, &default_config());
        assert_eq!(scored_total(&c), Some(1));
        assert!(!c.is_eligible());
    }

    #[test]
    fn bounds_position_does_not_affect_score() {
        let mut snap = ImageSnapshot::new("/x.jpg", 300.0, 300.0);
        let base = score(&snap, VIEWPORT);
        snap.bounds = Bounds {
            x: 5000.0,
            y: 5000.0,
            ..snap.bounds
        };
        assert_eq!(score(&snap, VIEWPORT), base);
    }
}

//! The inspection report: what the pipeline decides for one image.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use reskin_pipeline::{
    AlphaHistogram, Catalog, CategorySelector, Classification, ImageSnapshot, RejectReason,
    ReplacerConfig, RgbaImage, Selection, SwapPlan, Viewport, classify,
};
use serde::Serialize;

/// Everything decided about one image, in pipeline order.
#[derive(Debug, Serialize)]
pub struct Report {
    pub image: String,
    pub natural_width: u32,
    pub natural_height: u32,
    pub snapshot: ImageSnapshot,
    pub viewport: Viewport,
    pub classification: Classification,
    pub histogram: AlphaHistogram,
    pub transparent: bool,
    pub selection: Option<Selection>,
    pub plan: Option<SwapPlan>,
}

impl Report {
    /// Classify `snapshot`, measure `pixels`, and pick a replacement if
    /// the image is eligible. `seed` drives the selector.
    #[must_use]
    pub fn build(
        image: String,
        pixels: &RgbaImage,
        snapshot: ImageSnapshot,
        viewport: Viewport,
        config: &ReplacerConfig,
        seed: u64,
    ) -> Self {
        let classification = classify(&snapshot, viewport, config);
        let histogram = AlphaHistogram::from_image(pixels);
        let transparent = histogram.has_significant_transparency();

        let (selection, plan) = if classification.is_eligible() {
            let mut selector =
                CategorySelector::new(Catalog::builtin(), SmallRng::seed_from_u64(seed));
            let selection = selector.select(&snapshot, viewport, transparent);
            let plan = SwapPlan::new(&snapshot, &selection, &config.image_folder);
            (Some(selection), Some(plan))
        } else {
            (None, None)
        };

        Self {
            image,
            natural_width: pixels.width(),
            natural_height: pixels.height(),
            snapshot,
            viewport,
            classification,
            histogram,
            transparent,
            selection,
            plan,
        }
    }

    /// Human-readable multi-line report.
    #[must_use]
    pub fn render(&self) -> String {
        let b = self.snapshot.bounds;
        let mut lines = vec![
            format!(
                "Image:        {} ({}x{})",
                self.image, self.natural_width, self.natural_height
            ),
            format!(
                "Rendered box: {}x{} in a {}x{} viewport",
                b.width, b.height, self.viewport.width, self.viewport.height
            ),
        ];

        match &self.classification {
            Classification::Rejected { reason } => {
                lines.push(format!("Decision:     rejected, {}", describe(reason)));
            }
            Classification::Scored {
                score,
                total,
                min_score,
            } => {
                let verdict = if self.classification.is_eligible() {
                    "eligible"
                } else {
                    "not eligible"
                };
                lines.push(format!(
                    "Decision:     score {total} (min {min_score}), {verdict}"
                ));
                lines.extend(
                    [
                        ("size tier", score.size_tier),
                        ("aspect ratio", score.aspect),
                        ("content context", score.content_context),
                        ("viewport share", score.viewport_relative),
                        ("raster extension", score.extension),
                        ("vector penalty", score.vector_penalty),
                    ]
                    .into_iter()
                    .map(|(name, value)| format!("  {name:<18} {value:+}")),
                );
            }
        }

        let h = &self.histogram;
        lines.push(format!(
            "Alpha:        opaque={} partial={} transparent={} ({:.3}% non-opaque), {}",
            h.opaque,
            h.partial,
            h.transparent,
            h.transparency_percent(),
            if self.transparent { "transparent" } else { "opaque" },
        ));

        lines.push(match (&self.selection, &self.plan) {
            (Some(selection), Some(plan)) => format!(
                "Replacement:  {} ({}, object-fit: {}, {} x {})",
                plan.src,
                selection.category,
                plan.object_fit.as_str(),
                plan.width,
                plan.height,
            ),
            _ => "Replacement:  none".to_owned(),
        });

        lines.join("\n")
    }
}

fn describe(reason: &RejectReason) -> String {
    match reason {
        RejectReason::BelowMinimumSize => "below the configured minimum size".into(),
        RejectReason::BelowAbsoluteFloor => "below the absolute size floor".into(),
        RejectReason::UiAssetPath { fragment } => format!("UI asset path ({fragment})"),
        RejectReason::ChromeAncestor { tag } => format!("inside page chrome (<{tag}>)"),
        RejectReason::CornerAnchored => "pinned near a top corner".into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reskin_pipeline::{Category, ElementNode};

    use super::*;

    const VIEWPORT: Viewport = Viewport::new(1920.0, 1080.0);

    fn opaque(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_raw(w, h, vec![255; (w * h * 4) as usize]).unwrap()
    }

    #[test]
    fn eligible_square_gets_a_selection() {
        let snap = ImageSnapshot::new("photo.jpg", 300.0, 300.0).within(ElementNode::new("article"));
        let report = Report::build(
            "photo.jpg".into(),
            &opaque(30, 30),
            snap,
            VIEWPORT,
            &ReplacerConfig::default(),
            1,
        );
        assert!(!report.transparent);
        let selection = report.selection.as_ref().unwrap();
        assert_eq!(selection.category, Category::Square);
        let text = report.render();
        assert!(text.contains("score 9 (min 3), eligible"), "{text}");
        assert!(text.contains("  viewport share     +2"), "{text}");
        assert!(text.contains("/images/square/"), "{text}");
    }

    #[test]
    fn rejected_image_has_no_selection() {
        let snap = ImageSnapshot::new("/icons/cart.png", 300.0, 300.0);
        let report = Report::build(
            "cart.png".into(),
            &opaque(8, 8),
            snap,
            VIEWPORT,
            &ReplacerConfig::default(),
            1,
        );
        assert!(report.selection.is_none());
        assert!(report.plan.is_none());
        let text = report.render();
        assert!(text.contains("rejected, UI asset path (/icon)"), "{text}");
        assert!(text.ends_with("Replacement:  none"));
    }

    #[test]
    fn json_report_names_the_outcome() {
        let snap = ImageSnapshot::new("thumb.jpg", 60.0, 60.0);
        let report = Report::build(
            "thumb.jpg".into(),
            &opaque(4, 4),
            snap,
            VIEWPORT,
            &ReplacerConfig::default(),
            1,
        );
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["classification"]["outcome"], "rejected");
        assert_eq!(json["classification"]["reason"]["kind"], "below_minimum_size");
        assert_eq!(json["selection"], serde_json::Value::Null);
    }
}

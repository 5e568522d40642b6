//! Category selection and non-repeating asset choice.
//!
//! The category comes from the transparency verdict and the source
//! geometry (first match wins):
//!
//! 1. transparent source → [`Category::Transparent`]
//! 2. banner-like source → [`Category::Wide`]
//! 3. aspect > 1.5 → [`Category::Wide`]
//! 4. aspect < 0.7 → [`Category::Tall`]
//! 5. otherwise → [`Category::Square`]
//!
//! Within the category a candidate is drawn uniformly from the members
//! not in the [`RecencyWindow`], falling back to the whole category when
//! every member is recent.

use rand::Rng;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::lineage::{self, BANNER};
use crate::recency::RecencyWindow;
use crate::types::{Category, ImageSnapshot, Viewport};

/// A chosen replacement asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub category: Category,
    pub filename: String,
}

impl Selection {
    /// `"<category>/<filename>"`, the key stored in the recency window.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.category, self.filename)
    }

    /// The URL path under `image_folder` where the asset is served.
    #[must_use]
    pub fn path(&self, image_folder: &str) -> String {
        format!("{image_folder}{}", self.qualified_name())
    }
}

/// Whether the source image looks like a hero or banner.
#[must_use]
pub fn is_banner(snapshot: &ImageSnapshot, viewport: Viewport) -> bool {
    let b = snapshot.bounds;
    let aspect = b.aspect_ratio();
    let is_large = b.width > viewport.width * 0.5 || b.width > 800.0;

    aspect > 2.0
        || (aspect > 1.5 && is_large)
        || b.width > viewport.width * 0.8
        || is_banner_context(snapshot, viewport)
}

/// Whether the image sits in a banner-like container: a hero/banner class
/// on the lineage, or a very wide parent spanning most of the viewport.
#[must_use]
pub fn is_banner_context(snapshot: &ImageSnapshot, viewport: Viewport) -> bool {
    if lineage::closest(&snapshot.lineage, BANNER).is_some() {
        return true;
    }
    snapshot
        .parent_bounds
        .is_some_and(|p| p.aspect_ratio() > 2.5 && p.width > viewport.width * 0.7)
}

/// Map a source image to its replacement category.
#[must_use]
pub fn choose_category(snapshot: &ImageSnapshot, viewport: Viewport, transparent: bool) -> Category {
    let aspect = snapshot.bounds.aspect_ratio();
    if transparent {
        Category::Transparent
    } else if is_banner(snapshot, viewport) || aspect > 1.5 {
        Category::Wide
    } else if aspect < 0.7 {
        Category::Tall
    } else {
        Category::Square
    }
}

/// Draws replacement assets from a [`Catalog`] while steering away from
/// recent picks.
///
/// The recency window and random source are owned by the selector so
/// tests can seed and inspect both.
#[derive(Debug, Clone)]
pub struct CategorySelector<R> {
    catalog: Catalog,
    recent: RecencyWindow,
    rng: R,
}

impl<R: Rng> CategorySelector<R> {
    /// A selector with an empty default-capacity window.
    pub fn new(catalog: Catalog, rng: R) -> Self {
        Self::with_window(catalog, RecencyWindow::default(), rng)
    }

    /// A selector starting from a pre-seeded window.
    pub const fn with_window(catalog: Catalog, recent: RecencyWindow, rng: R) -> Self {
        Self {
            catalog,
            recent,
            rng,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn recent(&self) -> &RecencyWindow {
        &self.recent
    }

    /// Choose the category for `snapshot` and draw an asset from it.
    pub fn select(
        &mut self,
        snapshot: &ImageSnapshot,
        viewport: Viewport,
        transparent: bool,
    ) -> Selection {
        self.pick(choose_category(snapshot, viewport, transparent))
    }

    /// Draw an asset from `category` and record it in the window.
    pub fn pick(&mut self, category: Category) -> Selection {
        let files = self.catalog.files(category);
        let fresh: Vec<&String> = files
            .iter()
            .filter(|f| !self.recent.contains(&format!("{category}/{f}")))
            .collect();
        let pool: Vec<&String> = if fresh.is_empty() {
            files.iter().collect()
        } else {
            fresh
        };

        let index = self.rng.random_range(0..pool.len());
        let selection = Selection {
            category,
            filename: pool[index].clone(),
        };
        self.recent.push(selection.qualified_name());
        log::debug!(
            "selected {} (recent: {:?})",
            selection.qualified_name(),
            self.recent.iter().collect::<Vec<_>>(),
        );
        selection
    }
}

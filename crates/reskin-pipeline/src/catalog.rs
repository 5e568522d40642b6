//! The fixed set of replacement assets, partitioned by category.

use std::collections::HashSet;

use crate::types::{Category, ReskinError};

/// An immutable mapping from [`Category`] to an ordered list of candidate
/// filenames.
///
/// Construction guarantees every category is non-empty and no filename
/// appears in two categories, so selection can always produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: [Vec<String>; 4],
}

impl Catalog {
    /// Build a catalog from per-category filename lists.
    ///
    /// # Errors
    ///
    /// Returns [`ReskinError::InvalidCatalog`] if a category is empty, a
    /// category lists the same file twice, or a filename appears in more
    /// than one category.
    pub fn new(
        wide: Vec<String>,
        tall: Vec<String>,
        square: Vec<String>,
        transparent: Vec<String>,
    ) -> Result<Self, ReskinError> {
        let entries = [wide, tall, square, transparent];
        let mut seen = HashSet::new();
        for category in Category::ALL {
            let files = &entries[category.index()];
            if files.is_empty() {
                return Err(ReskinError::InvalidCatalog(format!(
                    "category {category} has no candidates"
                )));
            }
            for file in files {
                if !seen.insert(file.as_str()) {
                    return Err(ReskinError::InvalidCatalog(format!(
                        "{file} is listed more than once"
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// The built-in skin shipped with the proxy.
    #[must_use]
    pub fn builtin() -> Self {
        let names = |ids: &[u32], ext: &str| -> Vec<String> {
            ids.iter().map(|n| format!("deadpool-{n}.{ext}")).collect()
        };
        Self {
            entries: [
                names(&[14, 15, 16, 17, 18], "jpg"),
                names(&[6, 7, 8], "jpg"),
                names(&[1, 2, 3, 4, 5], "jpg"),
                names(&[9, 10, 11, 12, 13], "png"),
            ],
        }
    }

    /// Candidates for `category`, in catalog order. Never empty.
    #[must_use]
    pub fn files(&self, category: Category) -> &[String] {
        &self.entries[category.index()]
    }

    /// Total number of assets across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }

    /// Always `false`; present for API symmetry with [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

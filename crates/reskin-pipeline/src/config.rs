//! Runtime options for the replacer.
//!
//! Options are read from the hosting page's query string so an operator
//! can tune a single page load without rebuilding anything:
//!
//! ```text
//! https://proxy.example/www.site.com/page?aggressive=true&minScore=4
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for classification and replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacerConfig {
    /// Whether the aggressive preset is active.
    pub aggressive: bool,

    /// Minimum classification score for an image to be eligible.
    pub min_score: i32,

    /// Rendered width below which an image is rejected outright.
    pub min_width: u32,

    /// Rendered height below which an image is rejected outright.
    pub min_height: u32,

    /// URL prefix under which replacement assets are served. Category
    /// directories live directly below it.
    pub image_folder: String,

    /// Emit per-image debug logging.
    pub verbose: bool,
}

impl ReplacerConfig {
    pub const DEFAULT_MIN_SCORE: i32 = 3;
    pub const DEFAULT_MIN_SIZE: u32 = 120;
    pub const AGGRESSIVE_MIN_SCORE: i32 = 2;
    pub const AGGRESSIVE_MIN_SIZE: u32 = 80;
    pub const DEFAULT_IMAGE_FOLDER: &'static str = "/images/";

    /// The aggressive preset: lower score and size thresholds so more
    /// images are replaced.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            aggressive: true,
            min_score: Self::AGGRESSIVE_MIN_SCORE,
            min_width: Self::AGGRESSIVE_MIN_SIZE,
            min_height: Self::AGGRESSIVE_MIN_SIZE,
            ..Self::default()
        }
    }

    /// Build a config from a URL query string (with or without the
    /// leading `?`).
    ///
    /// Recognized keys: `aggressive=true`, `minScore`, `minWidth`,
    /// `minHeight`, `debug=true`. The aggressive preset is applied first,
    /// then individual overrides regardless of their order in the query.
    /// Unparsable values are logged and ignored.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let aggressive = pairs.iter().any(|(k, v)| k == "aggressive" && v == "true");
        let mut config = if aggressive {
            Self::aggressive()
        } else {
            Self::default()
        };

        for (key, value) in &pairs {
            match key.as_str() {
                "minScore" => match value.parse() {
                    Ok(n) => config.min_score = n,
                    Err(e) => log::warn!("ignoring minScore={value:?}: {e}"),
                },
                "minWidth" => match value.parse() {
                    Ok(n) => config.min_width = n,
                    Err(e) => log::warn!("ignoring minWidth={value:?}: {e}"),
                },
                "minHeight" => match value.parse() {
                    Ok(n) => config.min_height = n,
                    Err(e) => log::warn!("ignoring minHeight={value:?}: {e}"),
                },
                "debug" => config.verbose = value == "true",
                _ => {}
            }
        }

        config
    }
}

impl Default for ReplacerConfig {
    fn default() -> Self {
        Self {
            aggressive: false,
            min_score: Self::DEFAULT_MIN_SCORE,
            min_width: Self::DEFAULT_MIN_SIZE,
            min_height: Self::DEFAULT_MIN_SIZE,
            image_folder: Self::DEFAULT_IMAGE_FOLDER.to_owned(),
            verbose: false,
        }
    }
}

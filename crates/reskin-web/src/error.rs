//! Browser-side errors.

use reskin_pipeline::ReskinError;
use wasm_bindgen::JsValue;

/// Errors raised while talking to the DOM.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// A browser API call threw.
    #[error("browser API error: {0}")]
    JsError(String),

    /// Not running in a window context.
    #[error("no global window")]
    NoWindow,

    /// The document has no `<body>` to observe.
    #[error("document has no body")]
    NoBody,

    /// An image fired `error` instead of `load`.
    #[error("failed to load {0}")]
    Load(String),

    /// An image loaded with a zero natural size.
    #[error("{0} has no pixels")]
    Empty(String),

    /// `getContext("2d")` returned nothing usable.
    #[error("2d canvas context unavailable")]
    NoContext,
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<WebError> for ReskinError {
    fn from(err: WebError) -> Self {
        Self::Host(err.to_string())
    }
}

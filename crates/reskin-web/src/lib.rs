//! Browser entry point for reskin.
//!
//! This crate compiles to a WASM module injected into proxied pages. On
//! instantiation it reads options from the page's query string, waits
//! for the DOM, then runs the `reskin-pipeline` replacer over every image
//! already on the page and every image added later.
//!
//! Nothing here surfaces to the page: failures are logged to the console
//! and the affected image is left as it was.

pub mod console;
pub mod dom;
pub mod error;
pub mod event;
pub mod host;
pub mod observer;

use log::LevelFilter;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use reskin_pipeline::{Catalog, CategorySelector, Replacer, ReplacerConfig};
use wasm_bindgen::prelude::*;

pub use dom::DomImage;
pub use error::WebError;
pub use host::WebHost;

/// Called automatically when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console::init(LevelFilter::Info);

    let query = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let config = ReplacerConfig::from_query(&query);
    if config.verbose {
        log::set_max_level(LevelFilter::Debug);
    }
    log::debug!("starting with {config:?}");

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = run(config).await {
            log::error!("image replacement disabled: {e}");
        }
    });
}

#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
async fn run(config: ReplacerConfig) -> Result<(), WebError> {
    let host = WebHost::new()?;
    let document = host.document().clone();

    if document.ready_state() == "loading" {
        event::first_of(&document, &["DOMContentLoaded"], &[], || Ok(())).await?;
    }

    let body = document.body().ok_or(WebError::NoBody)?;
    // Observe before sweeping so nothing added in between is missed;
    // anything seen twice is skipped by its marker.
    let (observer, discovered) = observer::watch(&body)?;
    let initial = DomImage::within(&body);
    log::info!("found {} image(s) on load", initial.len());

    let selector = CategorySelector::new(Catalog::builtin(), SmallRng::seed_from_u64(seed()));
    let replacer = Replacer::new(host, config, selector);
    replacer.run(initial, discovered).await;

    drop(observer);
    Ok(())
}

/// A selector seed from `Math.random`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

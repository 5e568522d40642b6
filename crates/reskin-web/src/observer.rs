//! Structural monitoring: feed images added to the page into the pipeline.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, MutationObserver, MutationObserverInit, MutationRecord};

use crate::dom::DomImage;
use crate::error::WebError;

type Callback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// A subtree `MutationObserver` on the page body.
///
/// Dropping it disconnects the observer and closes the stream.
pub struct ImageObserver {
    observer: MutationObserver,
    _callback: Callback,
}

impl Drop for ImageObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Start observing `body`. Every `<img>` added afterwards, directly or
/// inside an added subtree, is sent on the returned stream.
///
/// # Errors
///
/// Returns [`WebError::JsError`] if the observer cannot be created or
/// attached.
pub fn watch(body: &HtmlElement) -> Result<(ImageObserver, UnboundedReceiver<DomImage>), WebError> {
    let (tx, rx) = mpsc::unbounded();

    let callback: Callback = Closure::new(move |records: js_sys::Array, _: MutationObserver| {
        for record in records.iter() {
            if let Ok(record) = record.dyn_into::<MutationRecord>() {
                forward_added(&record, &tx);
            }
        }
    });

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(body, &init)?;

    Ok((
        ImageObserver {
            observer,
            _callback: callback,
        },
        rx,
    ))
}

fn forward_added(record: &MutationRecord, tx: &UnboundedSender<DomImage>) {
    let added = record.added_nodes();
    for node in (0..added.length()).filter_map(|i| added.item(i)) {
        for image in DomImage::within(&node) {
            // The receiver only goes away when the pipeline has stopped.
            if tx.unbounded_send(image).is_err() {
                return;
            }
        }
    }
}

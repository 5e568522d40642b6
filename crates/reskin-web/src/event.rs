//! Awaiting DOM events as futures.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::EventTarget;

use crate::error::WebError;

/// Create a JS Promise along with its resolve and reject functions.
fn new_promise() -> Result<(js_sys::Promise, js_sys::Function, js_sys::Function), WebError> {
    let resolve = Rc::new(RefCell::new(None::<js_sys::Function>));
    let reject = Rc::new(RefCell::new(None::<js_sys::Function>));
    let resolve_clone = Rc::clone(&resolve);
    let reject_clone = Rc::clone(&reject);

    let promise = js_sys::Promise::new(&mut move |res, rej| {
        *resolve_clone.borrow_mut() = Some(res);
        *reject_clone.borrow_mut() = Some(rej);
    });

    let resolve_fn = resolve.borrow_mut().take();
    let reject_fn = reject.borrow_mut().take();
    match (resolve_fn, reject_fn) {
        (Some(res), Some(rej)) => Ok((promise, res, rej)),
        _ => Err(WebError::JsError("promise executor did not run".into())),
    }
}

/// Wait for the first of `resolve_on` (success) or `reject_on` (failure)
/// to fire on `target`.
///
/// `arm` runs after the listeners are attached, so it can start whatever
/// triggers the event (e.g. setting `src`). Listeners are detached once
/// the wait settles.
///
/// # Errors
///
/// [`WebError::JsError`] if a listener cannot be attached or `arm` fails,
/// and the event object if a `reject_on` event fired.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn first_of(
    target: &EventTarget,
    resolve_on: &[&str],
    reject_on: &[&str],
    arm: impl FnOnce() -> Result<(), WebError>,
) -> Result<JsValue, WebError> {
    let (promise, resolve, reject) = new_promise()?;

    for name in resolve_on {
        target.add_event_listener_with_callback(name, &resolve)?;
    }
    for name in reject_on {
        target.add_event_listener_with_callback(name, &reject)?;
    }

    let outcome = match arm() {
        Ok(()) => wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(WebError::from),
        Err(e) => Err(e),
    };

    for name in resolve_on {
        target.remove_event_listener_with_callback(name, &resolve).ok();
    }
    for name in reject_on {
        target.remove_event_listener_with_callback(name, &reject).ok();
    }

    outcome
}

//! "Call this once the element is on screen."
//!
//! Built on `IntersectionObserver` against the viewport. The callback runs
//! every time an entry reports a positive intersection ratio, not just the
//! first time, and the observer is never disconnected. Callers that want a
//! single run wrap their callback in [`once`].

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry};

pub fn respond_to_visibility<F>(element: &Element, mut callback: F) -> Result<IntersectionObserver, JsValue>
where
    F: FnMut() + 'static,
{
    let closure = Closure::wrap(Box::new(move |entries: js_sys::Array, _observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Some(entry) = entry.dyn_ref::<IntersectionObserverEntry>() else {
                continue;
            };
            if entry.intersection_ratio() > 0.0 {
                callback();
            }
        }
    }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    let observer = IntersectionObserver::new(closure.as_ref().unchecked_ref())?;
    observer.observe(element);
    // lives as long as the page
    closure.forget();
    Ok(observer)
}

/// Run `callback` on the first call only; later calls do nothing.
pub fn once<F: FnOnce()>(callback: F) -> impl FnMut() {
    let mut callback = Some(callback);
    move || {
        if let Some(callback) = callback.take() {
            callback();
        }
    }
}

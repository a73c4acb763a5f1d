//! Bridge to an optional page-provided `SimpleLightbox`.

use feditag_core::{Lightbox, NoLightbox};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

const CONSTRUCTOR: &str = "SimpleLightbox";

/// `new SimpleLightbox({ elements: selector })` for every gallery.
pub struct SimpleLightbox {
    constructor: Function,
}

impl SimpleLightbox {
    /// Look the constructor up on the global object.
    pub fn detect() -> Option<Self> {
        Reflect::get(&js_sys::global(), &JsValue::from_str(CONSTRUCTOR))
            .ok()?
            .dyn_into::<Function>()
            .ok()
            .map(|constructor| Self { constructor })
    }
}

impl Lightbox for SimpleLightbox {
    fn attach(&self, selector: &str) {
        let options = Object::new();
        let constructed = Reflect::set(&options, &"elements".into(), &selector.into())
            .and_then(|_| Reflect::construct(&self.constructor, &Array::of1(&options)));
        if let Err(e) = constructed {
            tracing::warn!(error = ?e, selector, "lightbox setup failed");
        }
    }
}

/// The page's lightbox if it has one, a no-op otherwise.
pub fn page_lightbox() -> Box<dyn Lightbox> {
    match SimpleLightbox::detect() {
        Some(lightbox) => {
            tracing::debug!("using page SimpleLightbox");
            Box::new(lightbox)
        }
        None => Box::new(NoLightbox),
    }
}

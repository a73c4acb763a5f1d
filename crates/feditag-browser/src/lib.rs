//! Browser layer for the `<fedi-tag>` widget.
//!
//! Implements the `feditag-core` seams on top of the DOM and assumes a
//! `wasm32-unknown-unknown` target.
//!
//! # Architecture
//!
//! - `dom`: `Surface` over `web-sys` elements, markup materialization
//! - `visibility`: `IntersectionObserver` based visibility trigger
//! - `fetch`: the single statuses request
//! - `lightbox`: optional page-provided `SimpleLightbox`
//! - `element`: custom element registration and widget lifecycle
//!
//! Loading the module registers `<fedi-tag>`; hosts that manage elements
//! themselves can call `mountFediTag(element)` instead.

pub mod dom;
pub mod element;
pub mod fetch;
pub mod lightbox;
pub mod visibility;

pub use dom::{DomContent, DomSurface, materialize};
pub use element::{ELEMENT_NAME, mount, register};
pub use visibility::{once, respond_to_visibility};

use wasm_bindgen::prelude::*;

/// Initialize panic hook and logging, then register the custom element.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_logging();

    if let Err(e) = register() {
        tracing::error!(error = ?e, "failed to register <{}>", ELEMENT_NAME);
    }
}

/// Mount a widget on an element that is not (or not yet) a `<fedi-tag>`.
#[wasm_bindgen(js_name = mountFediTag)]
pub fn mount_fedi_tag(host: web_sys::HtmlElement) -> Result<(), JsValue> {
    mount(&host)
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
fn init_logging() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
fn init_logging() {}

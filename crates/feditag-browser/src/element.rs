//! The `<fedi-tag>` element lifecycle.
//!
//! Mounting reads `host`, `account` and `tag` from the element, builds the
//! posts container, and waits for it to scroll into view before the one feed
//! request goes out. From then on each "fetching more" placeholder pulls in the
//! next batch when it becomes visible.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Local;
use feditag_core::widget::report_config_error;
use feditag_core::{BatchOutcome, Widget, WidgetConfig};
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement};

use crate::dom::DomSurface;
use crate::fetch::fetch_statuses;
use crate::lightbox::page_lightbox;
use crate::visibility::{once, respond_to_visibility};

pub const ELEMENT_NAME: &str = "fedi-tag";

/// Wait before watching a fresh placeholder, so it is not already in view
/// while the batch above it is still being laid out.
const PLACEHOLDER_DELAY_MS: u32 = 500;

const MOUNTED_ATTR: &str = "data-feditag-mounted";

type SharedWidget = Rc<RefCell<Widget<DomSurface, Local>>>;

#[wasm_bindgen(inline_js = r#"
export function define_element(name, connected) {
    if (customElements.get(name)) {
        return;
    }
    customElements.define(name, class extends HTMLElement {
        connectedCallback() {
            connected(this);
        }
    });
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn define_element(name: &str, connected: &js_sys::Function) -> Result<(), JsValue>;
}

/// Register `<fedi-tag>` so every instance in the page mounts itself.
pub fn register() -> Result<(), JsValue> {
    let connected = Closure::wrap(Box::new(move |host: HtmlElement| {
        if let Err(e) = mount(&host) {
            tracing::error!(error = ?e, "failed to mount fedi-tag");
        }
    }) as Box<dyn FnMut(HtmlElement)>);

    define_element(ELEMENT_NAME, connected.as_ref().unchecked_ref())?;
    connected.forget();
    Ok(())
}

/// Attach a widget to `host`. Mounting the same element again does nothing.
///
/// The mounted marker is only set once the posts container exists, so a
/// failed build can be retried.
pub fn mount(host: &Element) -> Result<(), JsValue> {
    if host.has_attribute(MOUNTED_ATTR) {
        return Ok(());
    }

    let document = host
        .owner_document()
        .ok_or_else(|| JsValue::from_str("element has no owner document"))?;
    let scope = next_gallery_scope(&document);
    let (mut surface, container) = DomSurface::build(&document, host)?;
    host.set_attribute(MOUNTED_ATTR, &scope.to_string())?;

    let config = match WidgetConfig::from_attributes(|name| host.get_attribute(name)) {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&mut surface, &e);
            return Ok(());
        }
    };
    tracing::debug!(host = %config.host, tag = %config.tag, "mounting fedi-tag");

    let widget: SharedWidget = Rc::new(RefCell::new(
        Widget::new(config, surface, Local)
            .with_lightbox(page_lightbox())
            .with_gallery_scope(scope),
    ));

    // let the element finish attaching before it is observed
    Timeout::new(0, move || {
        let observed = respond_to_visibility(&container, move || load_feed(&widget));
        if let Err(e) = observed {
            tracing::error!(error = ?e, "cannot observe fedi-tag container");
        }
    })
    .forget();
    Ok(())
}

/// One past the highest scope held by a mounted widget in `document`.
///
/// Scopes live in the mounted marker, so removed widgets never cause reuse
/// while a widget with a higher scope is still on the page.
fn next_gallery_scope(document: &Document) -> u32 {
    let Ok(mounted) = document.query_selector_all(&format!("[{MOUNTED_ATTR}]")) else {
        return 0;
    };
    (0..mounted.length())
        .filter_map(|i| mounted.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .filter_map(|element| element.get_attribute(MOUNTED_ATTR)?.parse::<u32>().ok())
        .map(|scope| scope.saturating_add(1))
        .max()
        .unwrap_or(0)
}

/// Initial visibility callback. The widget's feed latch makes repeats no-ops.
fn load_feed(widget: &SharedWidget) {
    let Some(url) = widget.borrow_mut().begin_load() else {
        return;
    };
    let widget = widget.clone();
    spawn_local(async move {
        let response = fetch_statuses(url).await;
        let outcome = widget.borrow_mut().finish_load(response);
        watch_placeholder(&widget, outcome);
    });
}

/// Render the next batch once the placeholder left by the last one shows up.
fn watch_placeholder(widget: &SharedWidget, outcome: BatchOutcome<Option<Element>>) {
    let BatchOutcome::More(Some(placeholder)) = outcome else {
        return;
    };
    let widget = widget.clone();

    Timeout::new(PLACEHOLDER_DELAY_MS, move || {
        let target = placeholder.clone();
        let observed = respond_to_visibility(
            &target,
            once(move || {
                let outcome = widget.borrow_mut().continue_after(Some(placeholder));
                watch_placeholder(&widget, outcome);
            }),
        );
        if let Err(e) = observed {
            tracing::warn!(error = ?e, "cannot observe placeholder");
        }
    })
    .forget();
}

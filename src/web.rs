use std::rc::Rc;

use gloo_net::http::{Method as HttpMethod, Request};
use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    CssStyleDeclaration, Document, Element, Event, EventTarget, FormData, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, NodeList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Window,
};

use crate::analytics::{AnalyticsError, AnalyticsEvent, AnalyticsSink, LogSink, Tracker};
use crate::config::{self, PageConfig};
use crate::controller::PageController;
use crate::dom::{Dom, Selector};
use crate::popup::PopupKind;
use crate::submit::{Method, SubmitRequest, SubmitResponse, Transport, TransportError};

const CONFIG_ELEMENT_ID: &str = "page-config";

pub type WebController = PageController<WebDom, DataLayerSink, FetchTransport>;

pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }
}

fn elements(list: Result<NodeList, JsValue>, selector: Selector<'_>) -> Vec<Element> {
    match list {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(e) => {
            tracing::debug!(selector = %selector.css(), error = ?e, "query failed");
            Vec::new()
        }
    }
}

fn apply_style(style: CssStyleDeclaration, property: &str, value: &str) {
    let result = if value.is_empty() {
        style.remove_property(property).map(|_| ())
    } else {
        style.set_property(property, value)
    };
    if let Err(e) = result {
        tracing::debug!(property, error = ?e, "could not apply style");
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_all(&self, selector: Selector<'_>) -> Vec<Element> {
        elements(self.document.query_selector_all(&selector.css()), selector)
    }

    fn query_within(&self, root: &Element, selector: Selector<'_>) -> Vec<Element> {
        elements(root.query_selector_all(&selector.css()), selector)
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            apply_style(el.style(), property, value);
        }
    }

    fn set_body_style(&self, property: &str, value: &str) {
        if let Some(body) = self.document.body() {
            apply_style(body.style(), property, value);
        }
    }

    fn offset_top(&self, node: &Element) -> f64 {
        node.dyn_ref::<HtmlElement>().map_or(0.0, |el| el.offset_top() as f64)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn field_value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn form_fields(&self, form: &Element) -> Vec<(String, String)> {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return Vec::new();
        };
        let Ok(data) = FormData::new_with_form(form) else {
            return Vec::new();
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else {
            return Vec::new();
        };
        // File inputs yield Blobs, which have no string value and are skipped.
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let pair = entry.dyn_into::<Array>().ok()?;
                Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
            })
            .collect()
    }

    fn form_action(&self, form: &Element) -> String {
        form.dyn_ref::<HtmlFormElement>()
            .map(HtmlFormElement::action)
            .unwrap_or_default()
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn insert_after(&self, reference: &Element, node: &Element) {
        if let Some(parent) = reference.parent_node() {
            let _ = parent.insert_before(node, reference.next_sibling().as_ref());
        }
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }
}

/// Pushes events onto `window[queue]` when it has a callable `push`,
/// otherwise logs them.
pub struct DataLayerSink {
    window: Window,
    queue: String,
}

impl DataLayerSink {
    pub fn new(window: Window, queue: &str) -> Self {
        Self {
            window,
            queue: queue.to_string(),
        }
    }

    fn push_fn(&self) -> Option<(JsValue, Function)> {
        let queue = Reflect::get(&self.window, &JsValue::from_str(&self.queue)).ok()?;
        if !queue.is_object() {
            return None;
        }
        let push = Reflect::get(&queue, &JsValue::from_str("push")).ok()?;
        Some((queue, push.dyn_into::<Function>().ok()?))
    }
}

impl AnalyticsSink for DataLayerSink {
    fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let Some((queue, push)) = self.push_fn() else {
            return LogSink.record(event);
        };
        let record = event
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| AnalyticsError::Encode(e.to_string()))?;
        push.call1(&queue, &record)
            .map(|_| ())
            .map_err(|e| AnalyticsError::Push(format!("{:?}", e)))
    }
}

pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
        let method = match request.method {
            Method::Get => HttpMethod::GET,
            Method::Head => HttpMethod::HEAD,
            Method::Post => HttpMethod::POST,
            Method::Put => HttpMethod::PUT,
            Method::Patch => HttpMethod::PATCH,
            Method::Delete => HttpMethod::DELETE,
        };
        let mut builder = Request::new(&request.url).method(method);
        if let Some(body) = request.body {
            builder = builder.header("Content-Type", SubmitRequest::CONTENT_TYPE).body(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        // Any body that is not JSON counts as empty.
        let body = response.json::<Value>().await.ok();
        Ok(SubmitResponse { status, body })
    }
}

fn listen<F>(target: &EventTarget, kind: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    callback.forget(); // Handlers live as long as the page
    Ok(())
}

fn expose_globals(window: &Window, controller: &Rc<WebController>) -> Result<(), JsValue> {
    let show = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |message: JsValue, kind: JsValue| {
            let kind = kind
                .as_string()
                .map(|label| PopupKind::from_label(&label))
                .unwrap_or_default();
            controller.show_popup(message.as_string().as_deref(), kind);
        }) as Box<dyn FnMut(JsValue, JsValue)>)
    };
    Reflect::set(window, &JsValue::from_str("showPopup"), show.as_ref())?;
    show.forget();

    let close = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move || {
            controller.close_popup();
        }) as Box<dyn FnMut()>)
    };
    Reflect::set(window, &JsValue::from_str("closePopup"), close.as_ref())?;
    close.forget();
    Ok(())
}

/// Wires every page behavior into the live document.
pub fn mount(config: PageConfig) -> Result<Rc<WebController>, JsValue> {
    let dom = WebDom::new().ok_or_else(|| JsValue::from_str("no window or document"))?;
    let window = dom.window.clone();
    let sink = DataLayerSink::new(window.clone(), &config.analytics_queue);
    let controller = Rc::new(PageController::new(dom, Tracker::new(sink), FetchTransport, config));

    for anchor in controller.fragment_links() {
        let controller = controller.clone();
        let link = anchor.clone();
        listen(&anchor, "click", move |event| {
            let href = link.get_attribute("href").unwrap_or_default();
            if controller.on_anchor_click(&href).prevents_default() {
                event.prevent_default();
            }
        })?;
    }

    {
        let controller = controller.clone();
        listen(&window, "scroll", move |_| {
            controller.update_active_nav();
        })?;
    }

    expose_globals(&window, &controller)?;

    for target in controller.close_triggers() {
        let controller = controller.clone();
        listen(&target, "click", move |_| {
            controller.close_popup();
        })?;
    }

    for form in controller.contact_forms() {
        let controller = controller.clone();
        let target = form.clone();
        listen(&form, "submit", move |event| {
            event.prevent_default();
            let controller = controller.clone();
            let form = target.clone();
            spawn_local(async move {
                controller.submit(&form).await;
            });
        })?;
    }

    controller.init();
    tracing::info!("page controller mounted");
    Ok(controller)
}

/// Reads overrides from `<script id="page-config" type="application/json">` when present.
fn load_config(document: &Document) -> PageConfig {
    let Some(raw) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return PageConfig::default();
    };
    PageConfig::from_json(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring page config");
        PageConfig::default()
    })
}

fn mount_logged(document: &Document) {
    if let Err(e) = mount(load_config(document)) {
        tracing::error!(error = ?e, "failed to mount page controller");
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(config::log_level())
            .build(),
    );
    tracing::info!("Starting page controller");

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        tracing::error!("no document to attach to");
        return;
    };
    if document.ready_state() != "loading" {
        mount_logged(&document);
        return;
    }

    let target = document.clone();
    let mut pending = true;
    let on_ready = move |_: Event| {
        if std::mem::take(&mut pending) {
            mount_logged(&target);
        }
    };
    if let Err(e) = listen(&document, "DOMContentLoaded", on_ready) {
        tracing::error!(error = ?e, "could not wait for DOMContentLoaded");
    }
}

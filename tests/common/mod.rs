#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use contact_page::analytics::{AnalyticsError, AnalyticsEvent, AnalyticsSink, Tracker};
use contact_page::dom::Dom;
use contact_page::headless::{HeadlessDom, NodeId};
use contact_page::popup::{MESSAGE_ID, OVERLAY_ID, POPUP_ID, TITLE_ID};
use contact_page::{PageConfig, PageController, SubmitRequest, SubmitResponse, Transport, TransportError};
use futures::channel::oneshot;

pub struct PageNodes {
    pub nav_links: Vec<NodeId>,
    pub sections: Vec<NodeId>,
    pub stray_link: NodeId,
    pub popup: NodeId,
    pub overlay: NodeId,
    pub title: NodeId,
    pub message: NodeId,
    pub close_button: NodeId,
    pub form: NodeId,
    pub name: NodeId,
    pub email: NodeId,
    pub service: NodeId,
    pub message_box: NodeId,
}

pub const SECTIONS: [(&str, f64); 3] = [("home", 0.0), ("services", 800.0), ("contact", 1600.0)];

fn with_id(dom: &HeadlessDom, parent: NodeId, tag: &str, id: &str) -> NodeId {
    let node = dom.append(parent, tag);
    dom.set_attribute(node, "id", id);
    node
}

fn control(dom: &HeadlessDom, form: NodeId, tag: &str, name: &str) -> NodeId {
    let node = dom.append(form, tag);
    dom.set_attribute(node, "name", name);
    node
}

/// The contact page markup the controller is written against.
pub fn contact_page() -> (HeadlessDom, PageNodes) {
    let dom = HeadlessDom::new();
    let root = dom.body();

    let nav = dom.append(root, "nav");
    let nav_links = SECTIONS
        .iter()
        .map(|(id, _)| {
            let link = dom.append(nav, "a");
            dom.set_attribute(link, "href", &format!("#{}", id));
            link
        })
        .collect();

    let sections = SECTIONS
        .iter()
        .map(|(id, top)| {
            let section = with_id(&dom, root, "section", id);
            dom.set_offset_top(section, *top);
            section
        })
        .collect();

    let stray_link = dom.append(root, "a");
    dom.set_attribute(stray_link, "href", "#missing");

    let overlay = with_id(&dom, root, "div", OVERLAY_ID);
    let popup = with_id(&dom, root, "div", POPUP_ID);
    let title = with_id(&dom, popup, "h3", TITLE_ID);
    let message = with_id(&dom, popup, "p", MESSAGE_ID);
    let close_button = dom.append(popup, "button");
    dom.set_attribute(close_button, "class", "popup-close");

    let container = dom.append(root, "div");
    dom.set_attribute(container, "class", "contact-form");
    let form = dom.append(container, "form");
    dom.set_attribute(form, "action", "/api/contact");
    dom.set_attribute(form, "method", "post");
    let name = control(&dom, form, "input", "name");
    let email = control(&dom, form, "input", "email");
    let service = control(&dom, form, "select", "service");
    dom.set_attribute(service, "value", "web-design");
    let message_box = control(&dom, form, "textarea", "message");
    let submit = dom.append(form, "button");
    dom.set_attribute(submit, "type", "submit");

    let nodes = PageNodes {
        nav_links,
        sections,
        stray_link,
        popup,
        overlay,
        title,
        message,
        close_button,
        form,
        name,
        email,
        service,
        message_box,
    };
    (dom, nodes)
}

pub fn fill_valid(dom: &HeadlessDom, nodes: &PageNodes) {
    dom.set_value(nodes.name, "Jo");
    dom.set_value(nodes.email, "a@b.co");
    dom.set_value(nodes.message_box, "1234567890");
}

pub fn error_texts(dom: &HeadlessDom, form: NodeId) -> Vec<String> {
    dom.query_within(&form, contact_page::dom::Selector::ErrorAnnotations)
        .into_iter()
        .map(|note| dom.text(note))
        .collect()
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: RefCell<Vec<AnalyticsEvent>>,
}

impl AnalyticsSink for RecordingSink {
    fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Answers each request with the next scripted result.
#[derive(Default)]
pub struct ScriptedTransport {
    pub replies: RefCell<VecDeque<Result<SubmitResponse, TransportError>>>,
    pub requests: RefCell<Vec<SubmitRequest>>,
}

impl ScriptedTransport {
    pub fn replying(reply: Result<SubmitResponse, TransportError>) -> Self {
        let transport = Self::default();
        transport.replies.borrow_mut().push_back(reply);
        transport
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".to_string())))
    }
}

/// Holds the first request open until the test sends its reply. Later
/// requests get an empty response straight away.
pub struct GatedTransport {
    pub gate: RefCell<Option<oneshot::Receiver<Result<SubmitResponse, TransportError>>>>,
    pub sent: Cell<usize>,
}

impl GatedTransport {
    pub fn new() -> (Self, oneshot::Sender<Result<SubmitResponse, TransportError>>) {
        let (tx, rx) = oneshot::channel();
        let transport = Self {
            gate: RefCell::new(Some(rx)),
            sent: Cell::new(0),
        };
        (transport, tx)
    }
}

impl Transport for GatedTransport {
    async fn send(&self, _request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
        self.sent.set(self.sent.get() + 1);
        let Some(gate) = self.gate.borrow_mut().take() else {
            return Ok(SubmitResponse::default());
        };
        gate.await
            .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".to_string())))
    }
}

pub fn controller<T: Transport>(
    dom: HeadlessDom,
    transport: T,
) -> PageController<HeadlessDom, RecordingSink, T> {
    PageController::new(dom, Tracker::new(RecordingSink::default()), transport, PageConfig::default())
}

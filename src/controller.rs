use std::cell::RefCell;

use serde_json::Value;

use crate::analytics::{AnalyticsEvent, AnalyticsSink, Tracker, CONTACT_SUBMITTED, CONTACT_SUBMIT_ERROR};
use crate::anchors::{self, AnchorOutcome};
use crate::config::PageConfig;
use crate::dom::{Dom, Selector};
use crate::nav;
use crate::popup::{self, PopupKind, PopupState, OVERLAY_ID};
use crate::submit::{Method, SubmitOutcome, SubmitRequest, Transport};
use crate::validate::{self, ValidationReport};

/// Marks a form as pending until dropped, so an abandoned submission
/// (its future dropped mid-request) does not lock the form.
struct InFlightSlot<'a, N: PartialEq> {
    pending: &'a RefCell<Vec<N>>,
    form: N,
}

impl<'a, N: PartialEq + Clone> InFlightSlot<'a, N> {
    fn claim(pending: &'a RefCell<Vec<N>>, form: N) -> Self {
        pending.borrow_mut().push(form.clone());
        Self { pending, form }
    }
}

impl<N: PartialEq> Drop for InFlightSlot<'_, N> {
    fn drop(&mut self) {
        self.pending.borrow_mut().retain(|pending| *pending != self.form);
    }
}

/// Owns everything the page's handlers touch. Built once at startup; the
/// browser glue in `web` forwards events to these methods.
pub struct PageController<D: Dom, S, T> {
    dom: D,
    tracker: Tracker<S>,
    transport: T,
    config: PageConfig,
    popup: RefCell<PopupState>,
    in_flight: RefCell<Vec<D::Node>>,
}

impl<D, S, T> PageController<D, S, T>
where
    D: Dom,
    S: AnalyticsSink,
    T: Transport,
{
    pub fn new(dom: D, tracker: Tracker<S>, transport: T, config: PageConfig) -> Self {
        Self {
            dom,
            tracker,
            transport,
            config,
            popup: RefCell::new(PopupState::Hidden),
            in_flight: RefCell::new(Vec::new()),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Links that get smooth-scroll handling.
    pub fn fragment_links(&self) -> Vec<D::Node> {
        self.dom.query_all(Selector::FragmentLinks)
    }

    /// The overlay backdrop and every `.popup-close` control; a click on any of them closes the popup.
    pub fn close_triggers(&self) -> Vec<D::Node> {
        let mut triggers = self.dom.query_all(Selector::PopupCloseControls);
        triggers.extend(self.dom.element_by_id(OVERLAY_ID));
        triggers
    }

    /// Forms whose submission is intercepted. Forms outside `.contact-form` submit normally.
    pub fn contact_forms(&self) -> Vec<D::Node> {
        self.dom.query_all(Selector::ContactForms)
    }

    /// Work done once the page is parsed, before any event arrives.
    pub fn init(&self) {
        let active = self.update_active_nav();
        tracing::debug!(active = ?active, "page controller ready");
    }

    pub fn on_anchor_click(&self, href: &str) -> AnchorOutcome {
        anchors::follow(&self.dom, href)
    }

    pub fn update_active_nav(&self) -> Option<String> {
        nav::update(&self.dom, self.config.nav_lookahead, &self.config.active_class)
    }

    /// An empty or absent message shows the default copy for `kind`.
    pub fn show_popup(&self, message: Option<&str>, kind: PopupKind) -> bool {
        match popup::show(&self.dom, &self.config.copy, message, kind) {
            Some(state) => {
                *self.popup.borrow_mut() = state;
                true
            }
            None => false,
        }
    }

    pub fn close_popup(&self) -> bool {
        let closed = popup::close(&self.dom);
        if closed {
            *self.popup.borrow_mut() = PopupState::Hidden;
        }
        closed
    }

    pub fn popup_state(&self) -> PopupState {
        self.popup.borrow().clone()
    }

    pub fn validate_form(&self, form: &D::Node) -> ValidationReport {
        validate::validate_form(&self.dom, form, &self.config.error_style)
    }

    pub fn is_in_flight(&self, form: &D::Node) -> bool {
        self.in_flight.borrow().contains(form)
    }

    /// Runs the whole submit flow for one form. Never fails: every path ends
    /// in a no-op or a popup.
    pub async fn submit(&self, form: &D::Node) -> SubmitOutcome {
        if self.is_in_flight(form) {
            tracing::debug!("submission already pending for this form");
            return SubmitOutcome::InFlight;
        }
        if !self.validate_form(form).is_valid() {
            return SubmitOutcome::Invalid;
        }

        let fields = self.dom.form_fields(form);
        let service = fields
            .iter()
            .find(|(name, _)| name == "service")
            .map_or(Value::Null, |(_, value)| Value::String(value.clone()));
        let method = Method::from_attribute(self.dom.attribute(form, "method").as_deref());
        let request = SubmitRequest::from_form(&self.dom.form_action(form), method, &fields);
        tracing::debug!(url = %request.url, method = method.as_str(), "submitting contact form");

        let slot = InFlightSlot::claim(&self.in_flight, form.clone());
        let result = self.transport.send(request).await;
        drop(slot);

        match result {
            Ok(response) => {
                tracing::debug!(status = response.status, json = response.body.is_some(), "contact form delivered");
                self.dom.reset_form(form);
                self.tracker.track(AnalyticsEvent::new(CONTACT_SUBMITTED).with("service", service));
                self.show_popup(None, PopupKind::Success);
                SubmitOutcome::Delivered
            }
            Err(e) => {
                let error = e.to_string();
                tracing::error!(error = %error, "Form submit error");
                self.tracker.track(AnalyticsEvent::new(CONTACT_SUBMIT_ERROR).with("error", error.clone()));
                let message = self.config.copy.submit_failure_message.clone();
                self.show_popup(Some(message.as_str()), PopupKind::Error);
                SubmitOutcome::Failed(error)
            }
        }
    }
}

//! Client-side behavior for the marketing/contact page: smooth fragment
//! scrolling, active nav highlighting, the feedback popup, contact form
//! validation and submission with analytics.
//!
//! The logic runs against the [`dom::Dom`] trait, so it can be driven by the
//! browser (`web`, wasm32 only) or by [`headless::HeadlessDom`] in tests.

pub mod analytics;
pub mod anchors;
pub mod config;
pub mod controller;
pub mod dom;
pub mod headless;
pub mod nav;
pub mod popup;
pub mod submit;
pub mod validate;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use analytics::{AnalyticsEvent, AnalyticsSink, LogSink, Tracker};
pub use config::PageConfig;
pub use controller::PageController;
pub use popup::{PopupKind, PopupState};
pub use submit::{SubmitOutcome, SubmitRequest, SubmitResponse, Transport, TransportError};

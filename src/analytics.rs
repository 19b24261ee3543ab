use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub const CONTACT_SUBMITTED: &str = "contact_submitted";
pub const CONTACT_SUBMIT_ERROR: &str = "contact_submit_error";

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("could not encode event: {0}")]
    Encode(String),
    #[error("event queue rejected push: {0}")]
    Push(String),
}

/// One tracked event. Serializes flat, as `{"event": name, ...data}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

pub trait AnalyticsSink {
    fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError>;
}

/// Used when no event queue is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let data = serde_json::to_string(&event.data).map_err(|e| AnalyticsError::Encode(e.to_string()))?;
        tracing::info!(event = %event.event, %data, "trackEvent");
        Ok(())
    }
}

/// Best-effort event reporting: never fails, never blocks the page.
pub struct Tracker<S> {
    sink: Option<S>,
}

impl<S: AnalyticsSink> Tracker<S> {
    pub fn new(sink: S) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn without_sink() -> Self {
        Self { sink: None }
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn track(&self, event: AnalyticsEvent) {
        let result = match &self.sink {
            Some(sink) => sink.record(&event),
            None => LogSink.record(&event),
        };
        if let Err(e) = result {
            tracing::warn!(event = %event.event, error = %e, "trackEvent failed");
        }
    }
}

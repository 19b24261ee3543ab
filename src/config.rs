use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::DEBUG // Verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::INFO
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid page config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the page controller. Every field has a default, so a host
/// page only needs to embed the values it wants to change.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    /// How far below the top of the viewport a section may start and still count as active.
    pub nav_lookahead: f64,
    pub active_class: String,
    /// Name of the global event queue analytics events are pushed onto.
    pub analytics_queue: String,
    pub copy: PopupCopy,
    pub error_style: ErrorStyle,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            nav_lookahead: 200.0,
            active_class: "active".to_string(),
            analytics_queue: "dataLayer".to_string(),
            copy: PopupCopy::default(),
            error_style: ErrorStyle::default(),
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopupCopy {
    pub success_title: String,
    pub error_title: String,
    pub success_message: String,
    pub error_message: String,
    /// Shown when the submission request never completes.
    pub submit_failure_message: String,
}

impl Default for PopupCopy {
    fn default() -> Self {
        Self {
            success_title: "Thank you".to_string(),
            error_title: "Submission failed".to_string(),
            success_message: "Thank you for reaching out to us with your request. We sincerely appreciate your consideration and will contact you as soon as possible to assist you.".to_string(),
            error_message: "There was an error submitting the form. Please try again later.".to_string(),
            submit_failure_message: "There was an error submitting your request. Please try again later.".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErrorStyle {
    pub color: String,
    pub margin_top: String,
    pub font_size: String,
}

impl Default for ErrorStyle {
    fn default() -> Self {
        Self {
            color: "#e53e3e".to_string(),
            margin_top: "0.5rem".to_string(),
            font_size: "0.9rem".to_string(),
        }
    }
}

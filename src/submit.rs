use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never completed. Displays as the browser's own message,
    /// e.g. `TypeError: Failed to fetch`.
    #[error("{0}")]
    Network(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Reads a form's `method` attribute. Unset or unknown means POST.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        match raw.map(|m| m.trim().to_ascii_uppercase()).as_deref() {
            Some("GET") => Method::Get,
            Some("HEAD") => Method::Head,
            Some("PUT") => Method::Put,
            Some("PATCH") => Method::Patch,
            Some("DELETE") => Method::Delete,
            _ => Method::Post,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    fn allows_body(self) -> bool {
        !matches!(self, Method::Get | Method::Head)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub url: String,
    pub method: Method,
    /// `application/x-www-form-urlencoded`; `None` when the fields went into the query string.
    pub body: Option<String>,
}

impl SubmitRequest {
    pub const CONTENT_TYPE: &'static str = "application/x-www-form-urlencoded";

    pub fn from_form(action: &str, method: Method, fields: &[(String, String)]) -> Self {
        let encoded = encode_fields(fields);
        if method.allows_body() {
            return Self {
                url: action.to_string(),
                method,
                body: Some(encoded),
            };
        }

        // Like a native GET submission, the fields replace any existing query.
        let base = action.split(['?', '#']).next().unwrap_or(action);
        let url = if encoded.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, encoded)
        };
        Self { url, method, body: None }
    }
}

pub fn encode_fields(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", encode_component(name), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

// Form encoding uses `+` for spaces.
fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmitResponse {
    pub status: u16,
    /// Parsed JSON body, `None` when the body was not JSON.
    pub body: Option<Value>,
}

/// Sends a form submission. Only a request that never completes is an error;
/// any HTTP status counts as a response.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid,
    /// The same form already has a request pending.
    InFlight,
    Delivered,
    Failed(String),
}

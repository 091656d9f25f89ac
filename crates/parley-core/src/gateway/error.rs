use std::fmt;

use serde_json::Value;

/// What went wrong talking to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableKind {
    /// Could not connect, or the connection dropped
    Network,
    /// Request exceeded the configured timeout
    Timeout,
    /// Backend answered with a non-success status
    HttpStatus,
    /// Response body was not the expected JSON shape
    Decode,
    /// Backend answered a new-session request without an identifier
    MissingSession,
}

impl fmt::Display for UnavailableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableKind::Network => write!(f, "network"),
            UnavailableKind::Timeout => write!(f, "timeout"),
            UnavailableKind::HttpStatus => write!(f, "http_status"),
            UnavailableKind::Decode => write!(f, "decode"),
            UnavailableKind::MissingSession => write!(f, "missing_session"),
        }
    }
}

/// The single failure type of every backend round trip.
#[derive(Debug, Clone)]
pub struct UnavailableError {
    pub kind: UnavailableKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Raw response body or transport error chain, when available
    pub details: Option<String>,
}

impl UnavailableError {
    pub fn new(kind: UnavailableKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Builds an HTTP status error, pulling `{"error": "..."}` out of the body
    /// when the backend supplies one.
    pub fn http_status(status: u16, body: &str) -> Self {
        let details = (!body.trim().is_empty()).then(|| body.to_string());
        let reason = serde_json::from_str::<Value>(body).ok().and_then(|json| {
            let error = json.get("error")?;
            error
                .as_str()
                .or_else(|| error.get("message").and_then(Value::as_str))
                .map(str::to_string)
        });

        let message = match reason {
            Some(reason) => format!("HTTP {status}: {reason}"),
            None => format!("HTTP {status}"),
        };

        Self {
            kind: UnavailableKind::HttpStatus,
            message,
            details,
        }
    }

    pub fn missing_session() -> Self {
        Self::new(
            UnavailableKind::MissingSession,
            "Backend did not return a session id",
        )
    }

    /// Classifies a transport error from reqwest.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            UnavailableKind::Timeout
        } else if err.is_decode() {
            UnavailableKind::Decode
        } else {
            UnavailableKind::Network
        };
        let message = match kind {
            UnavailableKind::Timeout => "Backend timed out".to_string(),
            UnavailableKind::Decode => "Unexpected response from backend".to_string(),
            _ => "Backend unreachable".to_string(),
        };

        Self {
            kind,
            message,
            details: Some(error_chain(err)),
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}

impl fmt::Display for UnavailableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UnavailableError {}

//! Error taxonomy for remote calls.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service rejected the credential (missing, expired or invalid).
    #[error("authentication failed ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Unauthorized {
        status: StatusCode,
        detail: Option<String>,
    },
    /// Any other non-2xx response.
    #[error("API error {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Remote {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("invalid endpoint `{path}`: {source}")]
    Endpoint {
        path: &'static str,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl GatewayError {
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);
        if is_auth_status(status) {
            Self::Unauthorized { status, detail }
        } else {
            Self::Remote { status, detail }
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status, .. } | Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) | Self::Decode { source: e, .. } => e.status(),
            Self::Endpoint { .. } | Self::Client(_) => None,
        }
    }

    /// The message the service attached to its error response, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail, .. } | Self::Remote { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Service-provided message verbatim, or `fallback` when there is none.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

#[must_use]
pub fn is_auth_status(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, validation lists `{"detail": [{"msg": "..."}]}`,
/// and the common `{"error": {"message": "..."}}` / `{"message": "..."}` shapes.
#[must_use]
pub fn extract_detail(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body.trim()).ok()?;

    let message = match payload.get("detail") {
        Some(Value::String(detail)) => Some(detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    };

    message
        .or_else(|| {
            payload
                .pointer("/error/message")
                .or_else(|| payload.pointer("/message"))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .filter(|message| !message.trim().is_empty())
}

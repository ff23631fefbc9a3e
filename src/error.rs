use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::providers::ProviderKind;

/// Coarse classification of a relay failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
}

/// Failure of a single submission attempt.
///
/// `Display` yields the human-readable reason shown to the submitter. The
/// transport variant keeps the status code or network error for logs only.
#[derive(Debug)]
pub enum RelayError {
    Config(String),
    UnknownProvider(String),
    Transport {
        provider: ProviderKind,
        status: Option<u16>,
        detail: String,
    },
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::Config(_) | RelayError::UnknownProvider(_) => ErrorKind::Configuration,
            RelayError::Transport { .. } => ErrorKind::Transport,
        }
    }

    pub fn is_unknown_provider(&self) -> bool {
        matches!(self, RelayError::UnknownProvider(_))
    }

    pub(crate) fn transport(provider: ProviderKind, status: Option<u16>, detail: impl Into<String>) -> Self {
        RelayError::Transport {
            provider,
            status,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Config(msg) => write!(f, "{msg}"),
            RelayError::UnknownProvider(_) => write!(f, "Unknown form provider configured."),
            RelayError::Transport { provider, .. } => write!(f, "{}", provider.failure_message()),
        }
    }
}

impl std::error::Error for RelayError {}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    RateLimited(String),
    Relay(RelayError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::RateLimited(msg) => write!(f, "Rate Limited: {msg}"),
            AppError::Relay(err) => write!(f, "Relay Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            AppError::Relay(err) => match err.kind() {
                ErrorKind::Configuration => {
                    tracing::error!("Relay misconfigured: {err:?}");
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                ErrorKind::Transport => (StatusCode::BAD_GATEWAY, err.to_string()),
            },
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        AppError::Relay(err)
    }
}

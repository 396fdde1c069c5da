// src/error.rs
use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced to the user. Each one renders as the short message shown
/// in a notice or error panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Backend unreachable, or it answered with a non-2xx status.
    #[error("{message}")]
    Transport {
        status: Option<StatusCode>,
        message: String,
    },

    /// Malformed JSON or a missing/unusable header.
    #[error("{0}")]
    Parse(String),

    /// Rejected before any request was made (wrong file type, unreadable file).
    #[error("{0}")]
    UserInput(String),

    /// Step 1 of the upload flow failed. Carries the backend's body text.
    #[error("{0}")]
    Upload(String),

    /// Step 2 of the upload flow failed. The CV stays uploaded.
    #[error("{0}")]
    MatchTrigger(String),

    #[error("An upload is already in progress")]
    Busy,

    #[error("Local storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn transport(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.status(), err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", err))
    }
}

/// Pick the body text when the backend sent one, otherwise `fallback`.
pub fn message_or(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Message for a non-2xx body. The backend reports failures as
/// `{"detail": "..."}`; a string detail is shown as is, any other detail
/// (validation lists) gets `fallback`. Plain bodies go through [`message_or`].
pub fn backend_message(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(fields)) => match fields.get("detail") {
            Some(serde_json::Value::String(detail)) => message_or(detail, fallback),
            Some(_) => fallback.to_string(),
            None => message_or(body, fallback),
        },
        _ => message_or(body, fallback),
    }
}

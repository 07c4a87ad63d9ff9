//! Request error types.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by every [`AdvisorApi`](crate::AdvisorApi) operation.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The service answered with a non-success status.
    #[error("{}", status_display(.status, .message))]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, if there was one.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The document is not a type the service accepts.
    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    /// A document could not be read from disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_display(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("Server error {}: {}", status, message),
        None => format!("Server error {}", status),
    }
}

impl RequestError {
    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The human-readable message the server supplied, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's message verbatim, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Build a status error from a raw response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: Option<String>,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error);

        Self::Status { status, message }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, RequestError>;

//! Lifecycle of data a view fetched or computed remotely.

use advisor_api::RequestError;
use tracing::warn;

/// `Idle → Pending → {Ready, Failed}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Remote<T> {
    Idle,
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Remote::Idle
    }
}

impl<T> Remote<T> {
    /// Settle from a request outcome. Failures keep the server's message when it
    /// sent one, else `fallback`.
    pub fn settle(outcome: Result<T, RequestError>, fallback: &str) -> Self {
        match outcome {
            Ok(value) => Remote::Ready(value),
            Err(e) => Remote::Failed(failure_message(&e, fallback)),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Remote::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Remote::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> Remote<Vec<T>> {
    /// Loaded items, or an empty slice in any other state.
    pub fn items(&self) -> &[T] {
        self.ready().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Log a failed request and produce the text to show for it.
pub fn failure_message(error: &RequestError, fallback: &str) -> String {
    warn!(error = %error, status = ?error.status(), "{}", fallback);
    error.user_message(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_prefers_server_message() {
        let remote: Remote<()> = Remote::settle(
            Err(RequestError::Status {
                status: 400,
                message: Some("学号已存在".to_string()),
            }),
            "Failed to create student",
        );
        assert_eq!(remote.error(), Some("学号已存在"));
    }

    #[test]
    fn test_settle_falls_back() {
        let remote: Remote<()> = Remote::settle(
            Err(RequestError::Decode("eof".to_string())),
            "Failed to load students",
        );
        assert_eq!(remote.error(), Some("Failed to load students"));
    }

    #[test]
    fn test_items() {
        let remote: Remote<Vec<u8>> = Remote::Pending;
        assert!(remote.items().is_empty());
        assert!(remote.is_pending());
        let remote = Remote::Ready(vec![1, 2]);
        assert_eq!(remote.items(), &[1, 2]);
    }
}

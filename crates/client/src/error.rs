//! Error types for backend calls and session storage.

use reqwest::StatusCode;
use thiserror::Error;

/// Session storage failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Coarse classification used by pages to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backend unreachable or too slow. Worth a retry.
    Network,
    /// The caller is not signed in or lacks permission.
    Authorization,
    /// The backend answered with something unusable.
    Payload,
}

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, reset.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// 401. `session_cleared` is true when the local session was dropped.
    #[error("Unauthorized")]
    Unauthorized { session_cleared: bool },

    /// 403.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// A request URL could not be built.
    #[error("Invalid request URL: {0}")]
    Url(String),

    /// The session could not be persisted.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e)
        }
    }
}

impl ApiError {
    /// Build the error for a non-success status, using the backend's message when present.
    #[must_use]
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized {
                session_cleared: false,
            },
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Timeout => ErrorKind::Network,
            Self::Unauthorized { .. } | Self::Forbidden(_) => ErrorKind::Authorization,
            Self::NotFound(_)
            | Self::Status { .. }
            | Self::Decode(_)
            | Self::Url(_)
            | Self::Session(_) => ErrorKind::Payload,
        }
    }

    /// The inline message a page shows next to its retry control.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the server. Check your connection and retry.".into(),
            Self::Timeout => "The server took too long to respond. Please retry.".into(),
            Self::Unauthorized {
                session_cleared: true,
            } => "Your session has expired. Please sign in again.".into(),
            Self::Unauthorized {
                session_cleared: false,
            } => "Sign-in failed or is required.".into(),
            Self::Forbidden(_) => "You do not have permission to do that.".into(),
            Self::NotFound(_) => "The requested item was not found.".into(),
            Self::Status { message, .. } => message.clone(),
            Self::Decode(_) => "The server sent an unexpected response.".into(),
            Self::Url(_) | Self::Session(_) => "Something went wrong. Please retry.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, None),
            ApiError::Forbidden(m) if m == "Forbidden"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, Some("no order".into())),
            ApiError::NotFound(m) if m == "no order"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, Some("bad status".into())),
            ApiError::Status { status: 400, message } if message == "bad status"
        ));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ApiError::Timeout.kind(), ErrorKind::Network);
        assert_eq!(
            ApiError::Unauthorized {
                session_cleared: true
            }
            .kind(),
            ErrorKind::Authorization
        );
        assert_eq!(ApiError::Decode("x".into()).kind(), ErrorKind::Payload);
    }

    #[test]
    fn test_status_message_surfaces_backend_text() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            Some("Invalid status transition".into()),
        );
        assert_eq!(err.user_message(), "Invalid status transition");
    }
}

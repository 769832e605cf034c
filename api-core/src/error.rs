use reqwest::StatusCode;
use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The request never produced a response (connect failure, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-2xx status. `body` is the parsed JSON
    /// body, or the raw text as a JSON string when it was not JSON.
    #[error("HTTP {status}: {}", message_of(.body).unwrap_or("no message"))]
    Status {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// The envelope's success indicator was false.
    #[error("Rejected by server: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

/// Coarse classification used by callers deciding what a failure means for
/// the session and for the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    Unauthorized,
    Client,
    Server,
    Rejected,
    Decode,
    Cancelled,
    Local,
}

fn message_of(body: &serde_json::Value) -> Option<&str> {
    match body {
        serde_json::Value::Object(map) => map.get("message").and_then(|m| m.as_str()),
        serde_json::Value::String(text) if !text.is_empty() => Some(text.as_str()),
        _ => None,
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                ErrorKind::Unauthorized
            }
            ApiError::Status { status, .. } if status.is_server_error() => ErrorKind::Server,
            ApiError::Status { .. } => ErrorKind::Client,
            ApiError::Rejected { .. } => ErrorKind::Rejected,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Cancelled => ErrorKind::Cancelled,
            ApiError::InvalidRequest(_) | ApiError::Session(_) => {
                ErrorKind::Local
            }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network(e) if e.is_timeout())
    }

    /// The server-supplied message, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => message_of(body),
            ApiError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's message when present, otherwise
    /// the caller's fallback for this form.
    pub fn user_message(&self, fallback: &str) -> String {
        if let ApiError::Validation(errors) = self {
            return errors.to_string();
        }
        self.server_message()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_status_codes() {
        let unauthorized = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: json!({"message": "Unauthenticated."}),
        };
        assert_eq!(unauthorized.kind(), ErrorKind::Unauthorized);
        assert!(unauthorized.is_unauthorized());

        let server = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: json!(null),
        };
        assert_eq!(server.kind(), ErrorKind::Server);

        let unprocessable = ApiError::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({}),
        };
        assert_eq!(unprocessable.kind(), ErrorKind::Client);
        assert_eq!(ApiError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn user_message_prefers_server_message() {
        let err = ApiError::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({"status": false, "message": "The sku has already been taken."}),
        };
        assert_eq!(
            err.user_message("Failed to create product"),
            "The sku has already been taken."
        );

        let rejected = ApiError::Rejected { message: None };
        assert_eq!(
            rejected.user_message("Failed to update category. Please try again."),
            "Failed to update category. Please try again."
        );
    }

    #[test]
    fn plain_text_error_body_is_used_as_message() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!("Server Error"),
        };
        assert_eq!(err.server_message(), Some("Server Error"));
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error: Server Error");
    }
}

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// What the server said when it refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerReply {
    pub status: u16,
    /// The `message` field of a JSON error body, when there is one.
    pub message: Option<String>,
    /// The raw body, truncated.
    pub body: String,
}

impl fmt::Display for ServerReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}", message),
            None if self.body.is_empty() => write!(f, "status {}", self.status),
            None => write!(f, "{}", self.body),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request rejected: {0}")]
    BadRequest(ServerReply),

    #[error("Unauthorized: {0}")]
    Unauthorized(ServerReply),

    #[error("Access denied: {0}")]
    AccessDenied(ServerReply),

    #[error("Resource not found: {0}")]
    NotFound(ServerReply),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(ServerReply),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    fn extract_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let reply = ServerReply {
            status: status.as_u16(),
            message: Self::extract_message(body),
            body: Self::truncate_body(body),
        };
        match status.as_u16() {
            401 => ApiError::Unauthorized(reply),
            403 => ApiError::AccessDenied(reply),
            404 => ApiError::NotFound(reply),
            429 => ApiError::RateLimited,
            400..=499 => ApiError::BadRequest(reply),
            500..=599 => ApiError::ServerError(reply),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, reply.body)),
        }
    }

    pub fn reply(&self) -> Option<&ServerReply> {
        match self {
            ApiError::BadRequest(reply)
            | ApiError::Unauthorized(reply)
            | ApiError::AccessDenied(reply)
            | ApiError::NotFound(reply)
            | ApiError::ServerError(reply) => Some(reply),
            _ => None,
        }
    }

    /// The server's own explanation, suitable for showing to the user.
    pub fn server_message(&self) -> Option<&str> {
        self.reply().and_then(|reply| reply.message.as_deref())
    }
}

/// Find the server's message anywhere in an error chain.
pub fn server_message(err: &anyhow::Error) -> Option<&str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(ApiError::server_message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_message() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Invalid credentials"}"#,
        );
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert_eq!(err.to_string(), "Request rejected: Invalid credentials");
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "{}"),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::MULTIPLE_CHOICES, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_non_json_body_has_no_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.to_string(), "Server error: boom");
    }

    #[test]
    fn test_truncate_body() {
        let body = "é".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_server_message_through_context() {
        let err = anyhow::Error::from(ApiError::from_status(
            StatusCode::CONFLICT,
            r#"{"message": "Email already registered"}"#,
        ))
        .context("Signup failed");
        assert_eq!(server_message(&err), Some("Email already registered"));
    }
}

//! API error taxonomy.
//!
//! Non-2xx responses carry a JSON body with a stable schema; this module
//! parses that schema and maps HTTP statuses onto error kinds.

use serde::Deserialize;
use thiserror::Error;

/// Error kinds for well-known API statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400 Bad Request.
    BadRequest,
    /// 403 Forbidden.
    Forbidden,
    /// 404 Not Found.
    NotFound,
    /// 409 Conflict.
    Conflict,
    /// 423 Locked.
    Locked,
    /// 429 Too Many Requests.
    TooManyRequests,
    /// 500 Internal Server Error.
    InternalServerError,
}

impl ApiErrorKind {
    /// Map an HTTP status code to a kind, if it is one the API documents.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::BadRequest),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            409 => Some(Self::Conflict),
            423 => Some(Self::Locked),
            429 => Some(Self::TooManyRequests),
            500 => Some(Self::InternalServerError),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BadRequest => "bad request",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Locked => "locked",
            Self::TooManyRequests => "too many requests",
            Self::InternalServerError => "internal server error",
        };
        f.write_str(s)
    }
}

/// The error message field may be a single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    /// A single message.
    One(String),
    /// Several messages, joined with `"; "` for display.
    Many(Vec<String>),
}

impl ErrorMessage {
    /// Collapse into one display string.
    pub fn joined(&self) -> String {
        match self {
            Self::One(s) => s.clone(),
            Self::Many(v) => v.join("; "),
        }
    }
}

/// Wire schema of an API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// HTTP status echoed by the API.
    pub status_code: Option<u16>,
    /// Provider-specific error code.
    pub error_code: Option<String>,
    /// Human-readable message(s).
    pub message: Option<ErrorMessage>,
    /// Response ID for support tickets.
    pub response_id: Option<String>,
}

/// Errors returned by the API client.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (DNS, TLS, connect, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401 Unauthorized. The API sends it without a body, so it is raised
    /// before the error schema is parsed.
    #[error("401 Unauthorized")]
    Unauthorized,

    /// The error body was not JSON or did not match the documented schema.
    #[error("malformed error response: {0}")]
    MalformedResponse(String),

    /// A non-2xx status outside the documented set, e.g. 502 Bad Gateway.
    #[error("unexpected response status: {status}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
    },

    /// A documented API error with its parsed body.
    #[error("{kind}: {message}")]
    Api {
        /// Error kind derived from the HTTP status.
        kind: ApiErrorKind,
        /// HTTP status echoed by the API.
        status_code: Option<u16>,
        /// Provider-specific error code.
        error_code: Option<String>,
        /// Joined human-readable message.
        message: String,
        /// Response ID for support tickets.
        response_id: Option<String>,
    },
}

impl Error {
    /// Build an [`Error`] from a non-2xx status and the raw response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 {
            return Self::Unauthorized;
        }
        let Some(kind) = ApiErrorKind::from_status(status) else {
            return Self::Unexpected { status };
        };
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self::Api {
                kind,
                status_code: parsed.status_code.or(Some(status)),
                error_code: parsed.error_code,
                message: parsed
                    .message
                    .as_ref()
                    .map(ErrorMessage::joined)
                    .unwrap_or_else(|| kind.to_string()),
                response_id: parsed.response_id,
            },
            Err(_) => Self::MalformedResponse(
                "response has no JSON schema or has invalid JSON syntax".into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_raised_before_schema_parsing() {
        // 401 responses have no body; mapping must not require one.
        let err = Error::from_response(401, "");
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn documented_status_with_valid_body() {
        let body = r#"{
            "status_code": 404,
            "error_code": "not_found",
            "message": "server not found",
            "response_id": "e9a2b1f0"
        }"#;
        let err = Error::from_response(404, body);
        match err {
            Error::Api {
                kind,
                status_code,
                error_code,
                message,
                response_id,
            } => {
                assert_eq!(kind, ApiErrorKind::NotFound);
                assert_eq!(status_code, Some(404));
                assert_eq!(error_code.as_deref(), Some("not_found"));
                assert_eq!(message, "server not found");
                assert_eq!(response_id.as_deref(), Some("e9a2b1f0"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn message_list_is_joined() {
        let body = r#"{"status_code": 400, "message": ["bad name", "bad size"]}"#;
        let err = Error::from_response(400, body);
        match err {
            Error::Api { message, .. } => assert_eq!(message, "bad name; bad size"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_body_is_malformed() {
        let err = Error::from_response(409, "<html>oops</html>");
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn undocumented_status_is_unexpected() {
        let err = Error::from_response(502, "Bad Gateway");
        assert!(matches!(err, Error::Unexpected { status: 502 }));
    }

    #[test]
    fn all_documented_statuses_have_kinds() {
        for (status, kind) in [
            (400, ApiErrorKind::BadRequest),
            (403, ApiErrorKind::Forbidden),
            (404, ApiErrorKind::NotFound),
            (409, ApiErrorKind::Conflict),
            (423, ApiErrorKind::Locked),
            (429, ApiErrorKind::TooManyRequests),
            (500, ApiErrorKind::InternalServerError),
        ] {
            assert_eq!(ApiErrorKind::from_status(status), Some(kind));
        }
        assert_eq!(ApiErrorKind::from_status(418), None);
    }

    #[test]
    fn missing_message_falls_back_to_kind() {
        let err = Error::from_response(423, r#"{"status_code": 423}"#);
        match err {
            Error::Api { message, .. } => assert_eq!(message, "locked"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}

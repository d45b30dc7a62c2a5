//! Error types for the servers.com API client.

use thiserror::Error;

/// Errors raised while talking to the servers.com API.
///
/// Every variant is cloneable so one failed batch call can be delivered to
/// all callers that were merged into it.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// Raised for `400 Bad Request`.
    #[error("bad request: {message}")]
    BadRequest {
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised for `401 Unauthorized`.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised for `403 Forbidden`.
    #[error("forbidden: {message}")]
    Forbidden {
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised for `404 Not Found`.
    #[error("not found: {message}")]
    NotFound {
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised for `409 Conflict`.
    #[error("conflict: {message}")]
    Conflict {
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised for `422 Unprocessable Entity`.
    #[error("unprocessable entity: {message}")]
    UnprocessableEntity {
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised for any `5xx` status.
    #[error("internal server error (status {status}): {message}")]
    Internal {
        /// HTTP status code.
        status: u16,
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised for any other non-success status.
    #[error("unexpected status {status}: {message}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// API error code.
        code: String,
        /// API error message.
        message: String,
    },
    /// Raised when the request never produced a response (connection
    /// failure, timeout).
    #[error("client request error: {message}")]
    Transport {
        /// Message returned by the HTTP client.
        message: String,
    },
    /// Raised when a response body cannot be decoded.
    #[error("parsing error: {message}, for body: {body}, with status code: {status}")]
    Parse {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
        /// Decoder error message.
        message: String,
    },
    /// Raised when the HTTP client cannot be constructed.
    #[error("client configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Maps an error response onto the matching variant.
    #[must_use]
    pub fn from_status(status: u16, code: String, message: String) -> Self {
        match status {
            400 => Self::BadRequest { code, message },
            401 => Self::Unauthorized { code, message },
            403 => Self::Forbidden { code, message },
            404 => Self::NotFound { code, message },
            409 => Self::Conflict { code, message },
            422 => Self::UnprocessableEntity { code, message },
            500..=599 => Self::Internal {
                status,
                code,
                message,
            },
            _ => Self::Unexpected {
                status,
                code,
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

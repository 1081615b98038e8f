//! Error types for the classification client.

use http::StatusCode;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when a failure carries no text of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Image upload failed, please retry";

/// Errors raised by the HTTP helpers, widgets and pages.
#[derive(Error, Debug)]
pub enum Error {
    /// An authenticated call was attempted with no stored token.
    #[error("no session token found, please log in")]
    AuthRequired,

    /// The server answered with a recognized error status.
    #[error("{message}")]
    ServerRejected { status: StatusCode, message: String },

    /// The server answered with a non-success status outside the recognized set.
    #[error("unexpected response status {status}")]
    UnexpectedStatus { status: StatusCode },

    /// The image endpoint returned something that is not an image.
    #[error("the server returned a non-image payload")]
    NonImageResponse,

    /// A local check failed before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A response body did not have the expected shape.
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// The stored token cannot be used as a bearer credential.
    #[error("stored session token is not a valid bearer credential")]
    InvalidToken,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),
}

/// Local, pre-network validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please select an image first")]
    NoFileSelected,

    #[error("no preview image, please select an image again")]
    NoPreview,

    #[error("the two passwords do not match, please re-enter them")]
    PasswordMismatch,

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

impl Error {
    /// Create an invalid response error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Text to surface to the user: the error's own message, or a generic
    /// fallback when that message is empty.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

//! Error taxonomy and Result alias for the Boxtrack client

use crate::types::FieldErrors;
use thiserror::Error;

/// Banner text shown when a call never produced a response
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Main error type for the Boxtrack client
#[derive(Error, Debug)]
pub enum Error {
    /// No usable refresh token; the session must return to the login entry point
    #[error("Not authenticated")]
    Unauthenticated,

    /// The call never produced a response (network, DNS, timeout)
    #[error("Network error: {0}")]
    TransportFault(String),

    /// A response arrived but the backend refused the operation
    #[error("Request rejected ({status}): {message}")]
    DomainRejection {
        status: u16,
        message: String,
        field_errors: FieldErrors,
    },

    /// Input rejected before any network call
    #[error("Invalid input: {0}")]
    ValidationFailure(FieldErrors),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message);
        Error::ValidationFailure(errors)
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated)
    }

    /// Per-field messages carried by rejections and validation failures
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Error::DomainRejection { field_errors, .. } => Some(field_errors),
            Error::ValidationFailure(errors) => Some(errors),
            _ => None,
        }
    }

    /// Text for the dismissible error banner
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated => "Your session has ended. Please log in again.".to_string(),
            Error::TransportFault(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            Error::DomainRejection { message, .. } if !message.is_empty() => message.clone(),
            Error::DomainRejection { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
            Error::ValidationFailure(errors) => errors
                .first_message()
                .unwrap_or("The value you provided is not valid")
                .to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::TransportFault(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

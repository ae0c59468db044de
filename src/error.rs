//! Error types for eforice.

use thiserror::Error;

use crate::auth::PasswordError;

/// Common error type for eforice.
#[derive(Error, Debug)]
pub enum EforiceError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// The database could not be reached or opened.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Password hashing or policy error.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),
}

impl From<sqlx::Error> for EforiceError {
    fn from(e: sqlx::Error) -> Self {
        EforiceError::Database(e.to_string())
    }
}

/// Result type alias for eforice operations.
pub type Result<T> = std::result::Result<T, EforiceError>;

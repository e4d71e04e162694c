//! Common error types for the DIDECO services

use thiserror::Error;

/// Common result type for DIDECO operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the DIDECO services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Natural-key collision (duplicate rut, username, folio)
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Translate a sqlx error, mapping unique-constraint violations to
    /// [`Error::Conflict`] so handlers can answer 409 instead of 500.
    pub fn from_sqlx(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Error::Conflict(what.to_string());
            }
        }
        Error::Database(err)
    }
}

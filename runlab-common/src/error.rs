//! Common error types for runlab

use thiserror::Error;

/// Common result type for runlab operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across runlab services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error
    ///
    /// Holds the rendered sqlx error so the variant exists with or without
    /// the `sqlx` feature.
    #[error("Database error: {0}")]
    Database(String),

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
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err.to_string())
    }
}

//! Errors raised by the shared storage and config layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Core or workspace database query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file missing (when named explicitly) or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored value or caller-supplied identifier failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

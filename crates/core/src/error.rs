//! Core error types

use thiserror::Error;

/// Core error type for VeriPass
#[derive(Debug, Error)]
pub enum CoreError {
    /// Field element parsing failure
    #[error("Field parse error: {0}")]
    FieldParse(String),

    /// Generic error
    #[error("Core error: {0}")]
    Generic(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

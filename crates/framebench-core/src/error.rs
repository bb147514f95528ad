//! Error types for framebench.

use thiserror::Error;

/// Main error type for framebench operations.
///
/// Every failure in the harness is fatal: configuration and parameter
/// errors abort before any GPU work, resource errors abort setup, and
/// operation/I-O errors abort the benchmark loop. Nothing is retried.
#[derive(Error, Debug)]
pub enum FramebenchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GPU device error: {0}")]
    Device(String),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for framebench operations.
pub type Result<T> = std::result::Result<T, FramebenchError>;

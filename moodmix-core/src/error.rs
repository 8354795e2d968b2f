//! Common error types for the MoodMix pipeline

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error types
///
/// Classification itself never fails (malformed responses and adapter
/// failures are absorbed by the parser and heuristics); these errors only
/// arise from configuration loading and validation.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

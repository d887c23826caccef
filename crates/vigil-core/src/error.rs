//! Core error types.

use thiserror::Error;

/// Errors surfaced by the core's store seams.
///
/// No core error is fatal to event processing: the pipeline degrades to
/// "no data" on store failures and to the default category on classifier
/// failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rule or record store failure.
    #[error("store error: {0}")]
    Store(String),

    /// Invalid configuration supplied by a caller.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

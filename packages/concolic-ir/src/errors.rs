//! Error types for concolic-ir
//!
//! Every slice owns its error enum; this one wraps them for callers that
//! drive a whole session.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::encoding::EncodingError;
use crate::features::instrumentation::RewriteError;
use crate::features::interpreter::ExecutionError;
use crate::features::shadow_store::StoreError;

/// Main error type for concolic-ir operations
#[derive(Debug, Error)]
pub enum ConcolicError {
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Classpath or trace (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for concolic-ir operations
pub type Result<T> = std::result::Result<T, ConcolicError>;

/*
 * Rewrite Error Types
 *
 * Fatal for the method being rewritten. The IR kinds are closed enums, so
 * there is no "unsupported construct" case: every kind is handled.
 */

use thiserror::Error;

use crate::features::encoding::EncodingError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Method '{method}' has no body to instrument")]
    MissingBody { method: String },

    #[error("Invalid assignment target '{target}' in '{method}': constants and 'this' can't be assigned")]
    InvalidAssignmentTarget { method: String, target: String },

    #[error("Label '{label}' is referenced but never defined in '{method}'")]
    UndefinedLabel { method: String, label: String },

    #[error("Catch marker for '{handler}' must directly follow its handler label in '{method}'")]
    MisplacedCatch { method: String, handler: String },

    #[error("Method '{method}' declares {declared} locals but uses local #{index}")]
    LocalOutOfRange {
        method: String,
        declared: u32,
        index: u32,
    },
}

pub type RewriteResult<T> = Result<T, RewriteError>;

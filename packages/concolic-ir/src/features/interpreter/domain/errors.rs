/*
 * Execution Error Types
 *
 * Exceptions thrown by the executed program are outcomes, not errors.
 * These variants mean the program, the classpath or the instrumentation
 * is broken.
 */

use thiserror::Error;

use crate::features::shadow_store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Method {class}.{name}{descriptor} not found")]
    MethodNotFound {
        class: String,
        name: String,
        descriptor: String,
    },

    #[error("No method {class}.{name} takes {arity} arguments")]
    NoMatchingOverload {
        class: String,
        name: String,
        arity: usize,
    },

    #[error("Method '{method}' has no body")]
    MissingBody { method: String },

    #[error("Label '{label}' is not defined in '{method}'")]
    UndefinedLabel { method: String, label: String },

    #[error("Invalid operand in '{method}': {detail}")]
    InvalidOperand { method: String, detail: String },

    #[error("Unknown store method '{0}'")]
    UnknownStoreMethod(String),

    #[error("Store method '{method}' got a bad argument #{index}")]
    BadStoreArgument { method: &'static str, index: usize },

    #[error("Step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },

    #[error("Call depth limit of {limit} exceeded")]
    CallDepthExceeded { limit: usize },

    #[error("Method '{method}' fell off the end of its body")]
    FellOffEnd { method: String },

    #[error("Shadow store error: {0}")]
    Store(#[from] StoreError),
}

pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/*
 * Encoding Error Types
 *
 * Every variant signals a classpath/session mismatch and is fatal for the
 * rewrite or decode that raised it.
 */

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("Class not found in classpath: '{class}'")]
    ClassNotFound { class: String },

    #[error("Method '{method}' is not declared by class '{class}'")]
    MethodNotFound { class: String, method: String },

    #[error("Field '{class}.{field}' not found on the superclass chain")]
    FieldNotFound { class: String, field: String },

    #[error("Id component '{component}' = {value} exceeds {bits} bits")]
    Overflow {
        component: &'static str,
        value: u64,
        bits: u32,
    },

    #[error("Can't decode instruction id {0:#018x}")]
    UnknownInstruction(u64),

    #[error("Can't decode static field access id {0:#018x}")]
    UnknownStaticAccess(u64),
}

pub type EncodingResult<T> = Result<T, EncodingError>;

//! Error types for the shadow trace store
//!
//! Any of these means the instrumented code and the store disagree about
//! frame layout; the target program cannot trigger them.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No active shadow frame")]
    NoActiveFrame,

    #[error("Shadow frame stack underflow")]
    StackUnderflow,

    #[error("{kind} flag index {index} out of bounds for frame of size {len}")]
    IndexOutOfBounds {
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("Concrete argument recorded before any instruction")]
    NoRecordedInstruction,
}

pub type StoreResult<T> = Result<T, StoreError>;

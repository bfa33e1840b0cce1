//! Tracer port

use crate::features::encoding::{EncodingResult, InstructionId};

/// Reads back what an instrumented execution left in its store
pub trait Tracer {
    type Trace;

    /// Decode the trace recorded so far. Reading twice without a reset
    /// yields the same trace.
    fn get_trace(&self) -> EncodingResult<Self::Trace>;

    /// Raw ids of the covered instructions, without decoding
    fn covered_instruction_ids(&self) -> Vec<InstructionId>;

    /// Clear the store for the next execution
    fn reset(&mut self);
}

// Reference interpreter for raw IR
//
// Hexagonal Architecture:
// - domain: ExecutionOutcome, HeapObject, ExecutionError
// - infrastructure: Heap, primitive operations, Interpreter, store dispatch
// - application: ConcolicSession (instrument once, run and trace many times)

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{ConcolicRun, ConcolicSession, CoverageRun, EntryCall};
pub use domain::{ExecutionError, ExecutionOutcome, ExecutionResult, HeapObject};
pub use infrastructure::{Heap, Interpreter, MAX_CALL_DEPTH};

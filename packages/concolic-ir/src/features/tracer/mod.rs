// Trace decoding
//
// Hexagonal Architecture:
// - domain: ConcolicTrace, TracedInstruction, TraceWithStatics
// - ports: Tracer trait
// - infrastructure: ConcolicTracer (flags + concrete snapshots),
//   InstructionTracer (coverage + static accesses)

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{ConcolicTrace, TraceWithStatics, TracedInstruction};
pub use infrastructure::{ConcolicTracer, InstructionTracer};
pub use ports::Tracer;

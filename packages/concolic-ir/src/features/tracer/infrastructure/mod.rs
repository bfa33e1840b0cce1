pub mod concolic_tracer;
pub mod instruction_tracer;

pub use concolic_tracer::ConcolicTracer;
pub use instruction_tracer::InstructionTracer;

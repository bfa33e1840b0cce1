pub mod trace_call_builder;

pub use trace_call_builder::{TraceCallBuilder, BOX_METHOD_NAME};

//! Instrumentation infrastructure

mod flag_propagation;
pub mod labels;
pub mod rewriter;
pub mod static_access;

pub use labels::{validate_labels, LabelAllocator};
pub use rewriter::MethodRewriter;
pub use static_access::{for_each_value, StaticAccessCollector, StaticAccesses};

// Virtual-method call builder
//
// Store operations are emitted as static calls against a class the
// instrumenting process never loads; the assembler resolves them by name
// and descriptor.
//
// - domain: StoreMethod (name + signature of every store operation)
// - infrastructure: TraceCallBuilder (IR instruction factories)

pub mod domain;
pub mod infrastructure;

pub use domain::{StoreMethod, FLAG_TYPE, STORE_CLASS};
pub use infrastructure::{TraceCallBuilder, BOX_METHOD_NAME};

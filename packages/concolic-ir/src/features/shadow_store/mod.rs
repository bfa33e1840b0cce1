//! Shadow trace store
//!
//! Session object injected into instrumented code as a single handle. The
//! instrumented program reaches it only through the static calls built by
//! `call_builder`; the interpreter dispatches those calls here.

mod error;
mod store;
mod types;

pub use error::*;
pub use store::ShadowTraceStore;
pub use types::*;

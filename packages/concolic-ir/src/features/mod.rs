//! Feature modules - Vertical slices of the instrumentation core
//!
//! Slices with ports follow Hexagonal Architecture:
//! - domain/         - Pure types and errors
//! - ports/          - Interface definitions (traits)
//! - application/    - Use cases
//! - infrastructure/ - Implementations
//!
//! Small slices (shadow_store) keep a flat layout.

pub mod call_builder;
pub mod encoding;
pub mod instrumentation;
pub mod interpreter;
pub mod shadow_store;
pub mod tracer;

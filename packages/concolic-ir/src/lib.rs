/*
 * Concolic IR - Instrumentation core for concolic execution
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Raw IR and classpath port
 * - features/    : Vertical slices (encoding → shadow_store → call_builder
 *                  → instrumentation → tracer → interpreter)
 * - config/      : Presets, builders, YAML v1
 *
 * Flow:
 * - Instrument: rewrite method bodies so they report to a shadow trace store
 * - Execute: run the rewritten IR (reference interpreter or external runtime)
 * - Trace: decode covered instructions, symbolic snapshots and static accesses
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Store calls mirror the runtime API
#![allow(clippy::type_complexity)] // Reverse tables keyed by tuples
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::clone_on_copy)] // Explicit clone for clarity

/// Shared models (raw IR, classpath)
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{InstrumentationConfig, Preset};
pub use errors::{ConcolicError, Result};
pub use features::encoding::{IdentifierEncoder, InstructionId, SharedEncoder, StaticAccessId};
pub use features::instrumentation::{ClassInstrumenter, Instrumenter, MethodRewriter};
pub use features::interpreter::{ConcolicSession, EntryCall, ExecutionOutcome, Interpreter};
pub use features::shadow_store::{ConcreteValue, ShadowTraceStore};
pub use features::tracer::{ConcolicTracer, InstructionTracer, Tracer};

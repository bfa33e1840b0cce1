//! Instrumentation domain

pub mod errors;

use serde::{Deserialize, Serialize};

use crate::shared::models::{ClassInfo, MethodInfo};

pub use errors::{RewriteError, RewriteResult};

/// Name of the re-invocable static initializer copy
pub const GENERATED_CLINIT_NAME: &str = "generatedClinit0";

/// Enum methods synthesized by the compiler, never instrumented
pub const ENUM_SYNTHETIC_METHODS: &[&str] = &["values", "valueOf"];

/// What the rewriter emits besides covered-instruction calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOptions {
    /// Flag propagation, shadow call stack and concrete snapshots
    pub concolic: bool,
    /// Static field GET/SET records
    pub track_static_access: bool,
}

impl RewriteOptions {
    pub fn coverage() -> Self {
        Self {
            concolic: false,
            track_static_access: true,
        }
    }

    pub fn concolic() -> Self {
        Self {
            concolic: true,
            track_static_access: true,
        }
    }
}

/// Per-method rewrite statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteStats {
    pub original_instructions: usize,
    pub emitted_instructions: usize,
    pub traced_instructions: usize,
    pub static_access_calls: usize,
    pub concrete_snapshot_sites: usize,
}

impl RewriteStats {
    /// Emitted instructions per original instruction
    pub fn expansion_ratio(&self) -> f64 {
        if self.original_instructions == 0 {
            return 0.0;
        }
        self.emitted_instructions as f64 / self.original_instructions as f64
    }

    pub fn merge(&mut self, other: &RewriteStats) {
        self.original_instructions += other.original_instructions;
        self.emitted_instructions += other.emitted_instructions;
        self.traced_instructions += other.traced_instructions;
        self.static_access_calls += other.static_access_calls;
        self.concrete_snapshot_sites += other.concrete_snapshot_sites;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentedMethod {
    pub method: MethodInfo,
    pub stats: RewriteStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentedClass {
    pub class: ClassInfo,
    /// Names (with descriptors) of the methods whose bodies were replaced
    pub instrumented_methods: Vec<String>,
    pub stats: RewriteStats,
}

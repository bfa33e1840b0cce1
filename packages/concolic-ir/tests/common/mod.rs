//! Common test utilities for concolic-ir
//!
//! This module provides IR builders, sample programs and trace assertions
//! shared by the integration suites.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

//! Shared module - Common types used by every feature
//!
//! The raw IR and the classpath port live here; nothing in this module
//! depends on a feature slice.

pub mod models;

pub use models::*;

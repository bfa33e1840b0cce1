//! Configuration I/O
//!
//! YAML schema types. Loading and export live in instrumentation_config.rs.

use serde::{Deserialize, Serialize};

use super::instrumentation_config::{InterpreterConfig, StoreConfig};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    #[serde(default)]
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Field overrides applied on top of the preset
    #[serde(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_constructors: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_static_initializers: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_static_access: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_static_initializer: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_workers: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<InterpreterConfig>,
}

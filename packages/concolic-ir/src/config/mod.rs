//! Instrumentation configuration
//!
//! - Level 1: Preset (`coverage` or `concolic`)
//! - Level 2: Builder overrides (`.store(|s| s.frame_capacity(64))`)
//! - Level 3: YAML v1 files (`InstrumentationConfig::from_yaml`)

pub mod error;
pub mod instrumentation_config;
pub mod io;
pub mod preset;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use instrumentation_config::{
    InstrumentationConfig, InterpreterConfig, StoreConfig, MAX_INITIAL_CAPACITY,
};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use validation::Validatable;

//! Configuration validation

use super::error::{ConfigError, ConfigResult};
use super::instrumentation_config::{InstrumentationConfig, InterpreterConfig, StoreConfig};

/// Trait for validatable configuration objects
pub trait Validatable {
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

impl Validatable for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        StoreConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "StoreConfig"
    }
}

impl Validatable for InterpreterConfig {
    fn validate(&self) -> ConfigResult<()> {
        InterpreterConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "InterpreterConfig"
    }
}

impl Validatable for InstrumentationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.store.validate()?;
        self.interpreter.validate()?;

        if self.num_workers > 256 {
            return Err(ConfigError::range_with_hint(
                "num_workers",
                self.num_workers,
                0,
                256,
                "Number of workers must be reasonable (0=auto)",
            ));
        }

        if !self.parallel && self.num_workers > 1 {
            return Err(ConfigError::Conflict {
                issue: format!(
                    "num_workers = {} but parallel rewriting is disabled",
                    self.num_workers
                ),
                fix: "set parallel: true or num_workers: 0".to_string(),
            });
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "InstrumentationConfig"
    }
}

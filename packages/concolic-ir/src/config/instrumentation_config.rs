//! Instrumentation configuration
//!
//! ```rust,ignore
//! use concolic_ir::config::{InstrumentationConfig, Preset};
//!
//! let config = InstrumentationConfig::preset(Preset::Concolic)
//!     .store(|s| s.frame_capacity(64))
//!     .instrument_constructors(true);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use super::validation::Validatable;

pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Upper bound for every initial store capacity
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Initial capacities of the shadow trace store buffers
///
/// Buffers double on overflow; these only size the first allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Covered-instruction records
    pub trace_capacity: usize,
    /// Shadow call frames
    pub frame_capacity: usize,
    /// Static field flag slots
    pub static_capacity: usize,
    /// Concrete argument snapshots per record
    pub argument_capacity: usize,
}

impl StoreConfig {
    pub fn trace_capacity(mut self, capacity: usize) -> Self {
        self.trace_capacity = capacity;
        self
    }

    pub fn frame_capacity(mut self, capacity: usize) -> Self {
        self.frame_capacity = capacity;
        self
    }

    pub fn static_capacity(mut self, capacity: usize) -> Self {
        self.static_capacity = capacity;
        self
    }

    pub fn argument_capacity(mut self, capacity: usize) -> Self {
        self.argument_capacity = capacity;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("store.trace_capacity", self.trace_capacity),
            ("store.frame_capacity", self.frame_capacity),
            ("store.static_capacity", self.static_capacity),
            ("store.argument_capacity", self.argument_capacity),
        ] {
            if value == 0 || value > MAX_INITIAL_CAPACITY {
                return Err(ConfigError::range_with_hint(
                    field,
                    value,
                    1,
                    MAX_INITIAL_CAPACITY,
                    "Buffers grow on demand; keep the initial size small",
                ));
            }
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            trace_capacity: 32,
            frame_capacity: 32,
            static_capacity: 32,
            argument_capacity: 8,
        }
    }
}

/// Reference interpreter limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Executed instructions before the run is aborted
    pub max_steps: u64,
}

impl InterpreterConfig {
    pub fn max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_steps == 0 {
            return Err(ConfigError::range_with_hint(
                "interpreter.max_steps",
                self.max_steps,
                1,
                u64::MAX,
                "At least one step is needed to execute anything",
            ));
        }
        Ok(())
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    pub preset: Preset,
    /// Rewrite `<init>` methods
    pub instrument_constructors: bool,
    /// Rewrite `<clinit>` methods
    pub instrument_static_initializers: bool,
    /// Emit static field GET/SET records
    pub track_static_access: bool,
    /// Keep a re-invocable copy of `<clinit>` as `generatedClinit0`
    pub preserve_static_initializer: bool,
    /// Rewrite the methods of a class on the rayon pool
    pub parallel: bool,
    /// Rayon workers for parallel rewriting (0 = one per CPU)
    pub num_workers: usize,
    pub store: StoreConfig,
    pub interpreter: InterpreterConfig,
}

impl InstrumentationConfig {
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            instrument_constructors: false,
            instrument_static_initializers: false,
            track_static_access: true,
            preserve_static_initializer: true,
            parallel: cfg!(feature = "parallel"),
            num_workers: 0,
            store: StoreConfig::default(),
            interpreter: InterpreterConfig::default(),
        }
    }

    pub fn coverage() -> Self {
        Self::preset(Preset::Coverage)
    }

    pub fn concolic() -> Self {
        Self::preset(Preset::Concolic)
    }

    /// Flag propagation and the shadow call stack are emitted
    pub fn is_concolic(&self) -> bool {
        self.preset == Preset::Concolic
    }

    pub fn instrument_constructors(mut self, enabled: bool) -> Self {
        self.instrument_constructors = enabled;
        self
    }

    pub fn instrument_static_initializers(mut self, enabled: bool) -> Self {
        self.instrument_static_initializers = enabled;
        self
    }

    pub fn track_static_access(mut self, enabled: bool) -> Self {
        self.track_static_access = enabled;
        self
    }

    pub fn preserve_static_initializer(mut self, enabled: bool) -> Self {
        self.preserve_static_initializer = enabled;
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn num_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    pub fn store<F>(mut self, f: F) -> Self
    where
        F: FnOnce(StoreConfig) -> StoreConfig,
    {
        self.store = f(self.store);
        self
    }

    pub fn interpreter<F>(mut self, f: F) -> Self
    where
        F: FnOnce(InterpreterConfig) -> InterpreterConfig,
    {
        self.interpreter = f(self.interpreter);
        self
    }

    /// Worker count after resolving `0` to the CPU count
    pub fn effective_workers(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get()
        } else {
            self.num_workers
        }
    }

    /// Load from a YAML file (v1 schema)
    pub fn from_yaml(path: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = Preset::from_str(&export.preset)
            .map_err(|_| ConfigError::UnknownPreset(export.preset.clone()))?;
        let config = Self::preset(preset).apply(export.overrides);
        config.validate()?;
        Ok(config)
    }

    /// Export to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.to_string(),
            overrides: ConfigOverrides {
                instrument_constructors: Some(self.instrument_constructors),
                instrument_static_initializers: Some(self.instrument_static_initializers),
                track_static_access: Some(self.track_static_access),
                preserve_static_initializer: Some(self.preserve_static_initializer),
                parallel: Some(self.parallel),
                num_workers: Some(self.num_workers),
                store: Some(self.store),
                interpreter: Some(self.interpreter),
            },
        };
        Ok(serde_yaml::to_string(&export)?)
    }

    fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(v) = overrides.instrument_constructors {
            self.instrument_constructors = v;
        }
        if let Some(v) = overrides.instrument_static_initializers {
            self.instrument_static_initializers = v;
        }
        if let Some(v) = overrides.track_static_access {
            self.track_static_access = v;
        }
        if let Some(v) = overrides.preserve_static_initializer {
            self.preserve_static_initializer = v;
        }
        if let Some(v) = overrides.parallel {
            self.parallel = v;
        }
        if let Some(v) = overrides.num_workers {
            self.num_workers = v;
        }
        if let Some(store) = overrides.store {
            self.store = store;
        }
        if let Some(interpreter) = overrides.interpreter {
            self.interpreter = interpreter;
        }
        self
    }
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(InstrumentationConfig::coverage().validate().is_ok());
        assert!(InstrumentationConfig::concolic().validate().is_ok());
        assert!(!InstrumentationConfig::coverage().is_concolic());
        assert!(InstrumentationConfig::concolic().is_concolic());
    }

    #[test]
    fn test_builder_overrides() {
        let config = InstrumentationConfig::concolic()
            .store(|s| s.frame_capacity(4).trace_capacity(2))
            .interpreter(|i| i.max_steps(10))
            .instrument_constructors(true);
        assert_eq!(config.store.frame_capacity, 4);
        assert_eq!(config.store.trace_capacity, 2);
        assert_eq!(config.store.static_capacity, 32);
        assert_eq!(config.interpreter.max_steps, 10);
        assert!(config.instrument_constructors);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let config = InstrumentationConfig::concolic().store(|s| s.static_capacity(0));
        match config.validate() {
            Err(ConfigError::Range { field, .. }) => assert_eq!(field, "store.static_capacity"),
            other => panic!("expected range error, got {:?}", other),
        }
    }

    #[test]
    fn test_effective_workers_resolves_auto() {
        assert!(InstrumentationConfig::concolic().effective_workers() >= 1);
        assert_eq!(
            InstrumentationConfig::concolic()
                .num_workers(3)
                .effective_workers(),
            3
        );
    }
}

//! Preset configurations
//!
//! A preset picks the instrumenter variant and its defaults.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Covered instructions and static field accesses only
    Coverage,

    /// Coverage plus symbolic flag propagation, the shadow call stack and
    /// concrete argument snapshots
    Concolic,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "coverage" => Ok(Self::Coverage),
            "concolic" => Ok(Self::Concolic),
            _ => Err(format!(
                "Unknown preset '{}'. Valid presets: coverage, concolic",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coverage => "coverage",
            Self::Concolic => "concolic",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Concolic
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

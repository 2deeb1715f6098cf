//! Engine configuration
//!
//! Typed boundary for externally-owned settings (CLI flags, UI forms,
//! API request bodies). Loading parses the file and validates both option
//! sets, so a bad value fails here rather than mid-analysis.

use crate::analysis::{AnalysisError, AnalysisOptions};
use crate::capacity::{EnvelopeError, EnvelopeOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Envelope and analysis settings for one engine run.
///
/// Only `envelope.max_depth_m` is mandatory in a config file; every other
/// field falls back to its documented default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub envelope: EnvelopeOptions,

    #[serde(default)]
    pub analysis: AnalysisOptions,
}

impl EngineConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.envelope.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}

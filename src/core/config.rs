//! Generator configuration and front-end limits, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::core::window::Padding;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// What to do with seed characters that are not in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UnknownCharPolicy {
    /// Fail the request with `UnknownCharacter`.
    Reject,
    /// Leave the character out of the context window.
    Skip,
    /// Use this character's index in place of the unknown one.
    Substitute(char),
}

impl Default for UnknownCharPolicy {
    fn default() -> Self {
        Self::Substitute(' ')
    }
}

/// Settings shared by every request served by one generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Context window length (L). Must match the model's training length.
    pub seq_length: usize,
    pub padding: Padding,
    pub unknown_chars: UnknownCharPolicy,
    /// Lower-case the seed before encoding it.
    pub lowercase_seed: bool,
    /// Wall-clock budget per request, checked between steps.
    pub timeout_ms: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seq_length: 40,
            padding: Padding::default(),
            unknown_chars: UnknownCharPolicy::default(),
            lowercase_seed: true,
            timeout_ms: None,
        }
    }
}

impl GeneratorConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seq_length == 0 {
            return Err(ConfigError::Invalid(
                "seq_length must be positive".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Ranges and defaults a CLI or UI front-end applies before calling the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationLimits {
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub default_seed: String,
    pub default_temperature: f64,
    pub default_length: usize,
    /// Temperatures used when a sweep is requested without explicit values.
    pub sweep_temperatures: Vec<f64>,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            min_temperature: 0.1,
            max_temperature: 1.2,
            min_length: 100,
            max_length: 800,
            default_seed: "the old man looked at".to_string(),
            default_temperature: 0.5,
            default_length: 400,
            sweep_temperatures: vec![0.2, 0.5, 1.0],
        }
    }
}

impl GenerationLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_temperature > 0.0 && self.min_temperature <= self.max_temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature range {}..={} is invalid",
                self.min_temperature, self.max_temperature
            )));
        }
        if self.min_length == 0 || self.min_length > self.max_length {
            return Err(ConfigError::Invalid(format!(
                "length range {}..={} is invalid",
                self.min_length, self.max_length
            )));
        }
        Ok(())
    }

    pub fn check_temperature(&self, temperature: f64) -> Result<(), ConfigError> {
        if (self.min_temperature..=self.max_temperature).contains(&temperature) {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "temperature {} outside {}..={}",
                temperature, self.min_temperature, self.max_temperature
            )))
        }
    }

    pub fn check_length(&self, length: usize) -> Result<(), ConfigError> {
        if (self.min_length..=self.max_length).contains(&length) {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "length {} outside {}..={}",
                length, self.min_length, self.max_length
            )))
        }
    }
}

/// Combined on-disk settings file: `(generator: (...), limits: (...))`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generator: GeneratorConfig,
    pub limits: GenerationLimits,
}

impl Settings {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Self = ron::from_str(&contents)?;
        settings.generator.validate()?;
        settings.limits.validate()?;
        Ok(settings)
    }
}

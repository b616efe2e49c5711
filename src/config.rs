//! File configuration.
//!
//! Every section is optional; missing values fall back to the defaults
//! used by the reference run (10,000 bytes from each of the four sources).

use crate::analysis::AnalyzerConfig;
use crate::sources::{SourcesConfig, SourcesConfigError, CSPRNG_ID, PRNG_ID, RANDOM_ID, URANDOM_ID};
use crate::study::{RunRequest, DEFAULT_SAMPLE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Bytes drawn from each source.
    pub sample_size: usize,
    /// Source identifiers to compare.
    pub sources: Vec<String>,
    /// Sample sources concurrently.
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            sources: [PRNG_ID, CSPRNG_ID, URANDOM_ID, RANDOM_ID]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            parallel: true,
        }
    }
}

impl RunConfig {
    /// Builds the run request described by this section.
    pub fn request(&self) -> RunRequest {
        RunRequest::new(self.sources.iter().cloned(), self.sample_size).parallel(self.parallel)
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[run]`: which sources, how many bytes, threading.
    #[serde(default)]
    pub run: RunConfig,
    /// `[analysis]`: analyzer thresholds.
    #[serde(default)]
    pub analysis: AnalyzerConfig,
    /// `[sources]`: provider construction.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    /// `run.sample_size` is zero.
    #[error("sample size must be positive")]
    InvalidSampleSize,
    /// `run.sample_size` is above `sources.max_sample_size`.
    #[error("sample size {size} exceeds the configured maximum {max}")]
    SampleSizeTooLarge {
        /// Requested size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
    /// `analysis.min_expected_per_bin` is not a positive finite number.
    #[error("minimum expected count per bin must be a positive number")]
    InvalidExpectedCount,
    /// Invalid `[sources]` section.
    #[error(transparent)]
    Sources(#[from] SourcesConfigError),
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sources.validate()?;
        if self.run.sample_size == 0 {
            return Err(ConfigError::InvalidSampleSize);
        }
        if self.run.sample_size > self.sources.max_sample_size {
            return Err(ConfigError::SampleSizeTooLarge {
                size: self.run.sample_size,
                max: self.sources.max_sample_size,
            });
        }
        let min = self.analysis.min_expected_per_bin;
        if !min.is_finite() || min <= 0.0 {
            return Err(ConfigError::InvalidExpectedCount);
        }
        Ok(())
    }
}

//! Configuration module for housekeeping tools
//!
//! Loaded from an optional TOML file. Every section and field has a default,
//! so an empty file (or no file) is a valid configuration.
//!
//! # Example
//! ```toml
//! [decoder]
//! on_unknown_chip = "skip"
//! dump = false
//!
//! [session]
//! log_name = "housekeeping_rtd.log"
//!
//! [notes]
//! max_note_length = 40
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::decoder::{RtdConfig, RtdDecoder, UnknownChipPolicy};
use crate::report::DEFAULT_MAX_NOTE_LENGTH;
use crate::session::RTD_LOG_NAME;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration if the file exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.log_name.is_empty() {
            return Err(ConfigError::Invalid("session.log_name is empty".to_string()));
        }
        if self.notes.max_note_length < 4 {
            return Err(ConfigError::Invalid(format!(
                "notes.max_note_length must be at least 4, got {}",
                self.notes.max_note_length
            )));
        }
        Ok(())
    }

    /// Build a decoder from the `[decoder]` section
    pub fn decoder(&self) -> RtdDecoder {
        RtdDecoder::new(RtdConfig {
            on_unknown_chip: self.decoder.on_unknown_chip,
            dump_enabled: self.decoder.dump,
        })
    }
}

/// `[decoder]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderConfig {
    /// "abort" (default) or "skip"
    #[serde(default)]
    pub on_unknown_chip: UnknownChipPolicy,

    #[serde(default)]
    pub dump: bool,
}

/// `[session]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_log_name")]
    pub log_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_name: default_log_name(),
        }
    }
}

fn default_log_name() -> String {
    RTD_LOG_NAME.to_string()
}

/// `[notes]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotesConfig {
    #[serde(default = "default_max_note_length")]
    pub max_note_length: usize,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            max_note_length: default_max_note_length(),
        }
    }
}

fn default_max_note_length() -> usize {
    DEFAULT_MAX_NOTE_LENGTH
}

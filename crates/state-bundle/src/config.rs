// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bundle configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration:
//!
//! ```toml
//! [diagnostics]
//! log_mismatches = true
//! mismatch_level = "warn"
//!
//! [decode]
//! max_depth = 64
//! max_entries = 1048576
//! max_collection_len = 16777216
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default nesting depth accepted by the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default number of entries accepted in one (nested) bundle.
pub const DEFAULT_MAX_ENTRIES: usize = 1 << 20;

/// Default element count accepted for one list/array/string.
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 24;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub decode: DecodeConfig,
}

/// How type mismatches are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit each mismatch through the `log` facade.
    #[serde(default = "default_true")]
    pub log_mismatches: bool,

    /// Level used for mismatch log records.
    #[serde(default)]
    pub mismatch_level: LogLevel,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            log_mismatches: true,
            mismatch_level: LogLevel::Warn,
        }
    }
}

/// Decoder resource limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_max_collection_len")]
    pub max_collection_len: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
        }
    }
}

/// Log level names accepted in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_log(self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_max_collection_len() -> usize {
    DEFAULT_MAX_COLLECTION_LEN
}

impl BundleConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let decode = &self.decode;
        if decode.max_depth == 0 {
            return Err(ConfigError::Invalid("decode.max_depth must be > 0".into()));
        }
        if decode.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "decode.max_entries must be > 0".into(),
            ));
        }
        if decode.max_collection_len == 0 {
            return Err(ConfigError::Invalid(
                "decode.max_collection_len must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Install the diagnostics section process-wide.
    pub fn apply(&self) {
        crate::diagnostics::install(self.diagnostics.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BundleConfig::default();
        assert!(config.diagnostics.log_mismatches);
        assert_eq!(config.diagnostics.mismatch_level, LogLevel::Warn);
        assert_eq!(config.decode.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = BundleConfig::from_toml_str(
            r#"
            [diagnostics]
            mismatch_level = "debug"

            [decode]
            max_depth = 8
            "#,
        )
        .expect("parse");
        assert!(config.diagnostics.log_mismatches);
        assert_eq!(config.diagnostics.mismatch_level.to_log(), log::Level::Debug);
        assert_eq!(config.decode.max_depth, 8);
        assert_eq!(config.decode.max_entries, DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = BundleConfig::from_toml_str("").expect("parse");
        assert_eq!(config, BundleConfig::default());
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let err = BundleConfig::from_toml_str("[decode]\nmax_entries = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_level_is_parse_error() {
        let err = BundleConfig::from_toml_str("[diagnostics]\nmismatch_level = \"loud\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[diagnostics]\nlog_mismatches = false").expect("write");
        let config = BundleConfig::from_file(file.path()).expect("load");
        assert!(!config.diagnostics.log_mismatches);
    }
}

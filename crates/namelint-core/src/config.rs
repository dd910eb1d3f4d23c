//! Configuration types for namelint.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Partial per-kind length overrides.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a limit is zero.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.limits.validate()?;
        Ok(config)
    }
}

/// Partial mapping from declaration kind to maximum identifier length.
/// Unspecified kinds keep the built-in defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum length for type names.
    #[serde(default)]
    pub r#type: Option<usize>,
    /// Maximum length for method names.
    #[serde(default)]
    pub method: Option<usize>,
    /// Maximum length for property names.
    #[serde(default)]
    pub property: Option<usize>,
    /// Maximum length for field names.
    #[serde(default)]
    pub field: Option<usize>,
    /// Maximum length for local variable names.
    #[serde(default)]
    pub variable: Option<usize>,
}

impl LimitsConfig {
    /// Checks that every specified threshold is at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLimit`] for a zero threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, value) in [
            ("type", self.r#type),
            ("method", self.method),
            ("property", self.property),
            ("field", self.field),
            ("variable", self.variable),
        ] {
            if value == Some(0) {
                return Err(ConfigError::InvalidLimit { kind });
            }
        }
        Ok(())
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum number of parallel file analyses (default: rayon's choice).
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/target/**".to_string(), "**/vendor/**".to_string()],
            parallelism: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in the config file.
    #[error("failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A configured threshold was zero.
    #[error("limit for `{kind}` must be at least 1")]
    InvalidLimit {
        /// The kind with the invalid threshold.
        kind: &'static str,
    },
}

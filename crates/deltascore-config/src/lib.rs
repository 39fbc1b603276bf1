//! Configuration system for deltascore.
//!
//! Load scoring session configuration from TOML or YAML to control
//! self-checking and constraint weights without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use deltascore_config::{EnvironmentMode, SessionConfig};
//!
//! let config = SessionConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!     tuple_capacity = 1024
//!
//!     [constraint_weights]
//!     "Room conflict" = "1hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert_eq!(config.tuple_capacity, Some(1024));
//! assert_eq!(config.constraint_weights.len(), 1);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use deltascore_config::SessionConfig;
//!
//! let config = SessionConfig::load("scoring.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use deltascore_core::ParseableScore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for deltascore_core::DeltaScoreError {
    fn from(err: ConfigError) -> Self {
        deltascore_core::DeltaScoreError::Config(err.to_string())
    }
}

/// Scoring session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Environment mode controlling self-checks after each flush.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Pre-allocation hint for the tuple arena.
    #[serde(default)]
    pub tuple_capacity: Option<usize>,

    /// Constraint weight overrides keyed by constraint name or full name,
    /// with values in the score's string form (e.g. `"1hard/0soft"`).
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

impl SessionConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Sets the tuple arena pre-allocation hint.
    pub fn with_tuple_capacity(mut self, capacity: usize) -> Self {
        self.tuple_capacity = Some(capacity);
        self
    }

    /// Adds a constraint weight override.
    pub fn with_constraint_weight(
        mut self,
        constraint: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        self.constraint_weights
            .insert(constraint.into(), weight.into());
        self
    }

    /// Parses every configured weight override as `Sc`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first constraint whose
    /// weight string is not a valid `Sc`.
    ///
    /// ```
    /// use deltascore_config::SessionConfig;
    /// use deltascore_core::HardSoftScore;
    ///
    /// let config = SessionConfig::new().with_constraint_weight("Room conflict", "2hard/0soft");
    /// let weights = config.parsed_constraint_weights::<HardSoftScore>().unwrap();
    /// assert_eq!(weights["Room conflict"], HardSoftScore::of(2, 0));
    /// ```
    pub fn parsed_constraint_weights<Sc: ParseableScore>(
        &self,
    ) -> Result<BTreeMap<String, Sc>, ConfigError> {
        self.constraint_weights
            .iter()
            .map(|(name, raw)| {
                Sc::parse(raw)
                    .map(|weight| (name.clone(), weight))
                    .map_err(|e| {
                        ConfigError::Invalid(format!(
                            "weight for constraint '{}': {}",
                            name, e
                        ))
                    })
            })
            .collect()
    }
}

/// Environment mode controlling how much a session checks itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// No checks beyond the propagation itself.
    #[default]
    Reproducible,

    /// Structural invariant checks after every flush.
    FastAssert,

    /// Structural checks plus comparison with a network rebuilt from scratch.
    FullAssert,
}

impl EnvironmentMode {
    /// Returns true if structural invariants are checked after each flush.
    pub fn is_asserted(self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    /// Returns true if each flush is compared against a from-scratch rebuild.
    pub fn is_fully_asserted(self) -> bool {
        self == EnvironmentMode::FullAssert
    }
}

impl fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnvironmentMode::Reproducible => "reproducible",
            EnvironmentMode::FastAssert => "fast_assert",
            EnvironmentMode::FullAssert => "full_assert",
        };
        f.write_str(name)
    }
}

#![forbid(unsafe_code)]

//! Policy-as-data configuration for binding contexts.
//!
//! A [`BindingConfig`] captures how contexts report failures, when an update
//! pass counts as slow and whether validation messages are sorted before they
//! are displayed. Defaults live in code; with the `config` feature the same
//! struct loads from TOML or JSON.
//!
//! ```toml
//! # bindings.toml
//! ui_update_errors = "log"
//! slow_update_threshold_us = 8000
//! sort_messages = true
//! ```
//!
//! ```rust,ignore
//! let config = BindingConfig::from_toml_file("bindings.toml")?;
//! let manager = BindingManager::with_config(config, validation);
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pmo_aspect::UiUpdateErrorPolicy;

/// How binding failures during an update pass are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum UiUpdateErrors {
    /// Log each failure and return them aggregated.
    #[default]
    Propagate,
    /// Log each failure and carry on.
    Log,
}

impl UiUpdateErrors {
    /// The matching error policy for model-to-UI aspect definitions.
    #[must_use]
    pub fn to_error_policy(self) -> UiUpdateErrorPolicy {
        match self {
            Self::Propagate => UiUpdateErrorPolicy::propagate(),
            Self::Log => UiUpdateErrorPolicy::log(),
        }
    }
}

/// Tunables shared by a binding manager and its contexts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BindingConfig {
    /// Failure reporting of update passes. Default: `propagate`.
    pub ui_update_errors: UiUpdateErrors,

    /// Update passes slower than this many microseconds log a warning.
    /// Zero disables the check. Default: 16 000 (one 60 Hz frame).
    pub slow_update_threshold_us: u64,

    /// Sort validation messages by descending severity before displaying
    /// them. Default: true.
    pub sort_messages: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            ui_update_errors: UiUpdateErrors::Propagate,
            slow_update_threshold_us: 16_000,
            sort_messages: true,
        }
    }
}

impl BindingConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; an empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        // One hour: anything above is certainly a unit mix-up (ms or ns).
        if self.slow_update_threshold_us > 3_600_000_000 {
            errors.push(format!(
                "slow_update_threshold_us must be at most 3600000000, got {}",
                self.slow_update_threshold_us
            ));
        }
        errors
    }

    #[cfg(feature = "config")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors loading a [`BindingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The values parsed but are out of range.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

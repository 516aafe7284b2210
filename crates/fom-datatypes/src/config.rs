// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration.
//!
//! Supports both programmatic and file-based configuration:
//!
//! ```toml
//! max_depth = 32
//! eager = true
//! record_cycles = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

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

/// Datatype registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum nesting depth of a single resolution.
    ///
    /// Depth is counted over the descriptors one lookup has to construct.
    /// Nested datatypes already in the cache are not descended into, so a
    /// lookup that exceeds the limit on a cold cache can succeed once its
    /// deeper references have been resolved on their own.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Resolve every declared datatype right after `initialize`.
    #[serde(default)]
    pub eager: bool,

    /// Keep a report of every cyclic reference met during construction.
    #[serde(default = "default_true")]
    pub record_cycles: bool,
}

fn default_max_depth() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            eager: false,
            record_cycles: true,
        }
    }
}

impl RegistryConfig {
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
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

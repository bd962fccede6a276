// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for propagation runs.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. rdm-prop.yaml file
//! 3. Environment variables (RDMPROP_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::propagator::{DensityPolicy, OperatorKernel, PropagationMethod};

/// Files looked up in the working directory when no path is given.
const DEFAULT_CONFIG_FILES: &[&str] = &["rdm-prop.yaml", "rdm-prop.yml"];

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Propagation options
    #[serde(default)]
    pub propagation: PropagationConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "configuration file {} not found",
                    path.display()
                )));
            }
            config = Self::from_file(path)?;
        } else if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
        {
            config = Self::from_file(path)?;
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply RDMPROP_* environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production).
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("RDMPROP_METHOD") {
            self.propagation.method = val;
        }
        if let Some(val) = lookup("RDMPROP_NREF") {
            self.propagation.nref = val
                .trim()
                .parse()
                .map_err(|_| {
                    Error::Config(format!("RDMPROP_NREF must be an integer, got '{val}'"))
                })?;
        }
        if let Some(val) = lookup("RDMPROP_VERBOSE") {
            self.propagation.verbose = val.to_lowercase() == "true" || val == "1";
        }
        if let Some(val) = lookup("RDMPROP_OPERATOR_KERNEL") {
            self.propagation.operator_kernel = val.parse()?;
        }
        if let Some(val) = lookup("RDMPROP_DENSITY_POLICY") {
            self.propagation.density_policy = val.parse()?;
        }
        if let Some(val) = lookup("RDMPROP_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.propagation.validate()?;
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(Error::Config(format!(
                "log format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Options applied to a propagator before a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Integration method name
    #[serde(default = "default_method")]
    pub method: String,

    /// Fine steps per coarse time step
    #[serde(default = "default_nref")]
    pub nref: usize,

    /// Log each coarse step
    #[serde(default)]
    pub verbose: bool,

    /// Kernel for operator-form relaxation
    #[serde(default)]
    pub operator_kernel: OperatorKernel,

    /// Post-step density matrix policy
    #[serde(default)]
    pub density_policy: DensityPolicy,
}

impl PropagationConfig {
    /// Parsed integration method.
    pub fn method(&self) -> Result<PropagationMethod> {
        self.method.parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.nref == 0 {
            return Err(Error::Config("nref must be at least 1".into()));
        }
        self.method()
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(())
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            nref: default_nref(),
            verbose: false,
            operator_kernel: OperatorKernel::default(),
            density_policy: DensityPolicy::default(),
        }
    }
}

fn default_method() -> String {
    "short-exp".into()
}

fn default_nref() -> usize {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

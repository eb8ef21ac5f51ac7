//! Registry configuration and builders

use crate::config::{ConfigError, ConfigValidator, RangeValidator};
use serde::{Deserialize, Serialize};
use service_builder::builder;
use std::env;

/// Environment variable toggling whether bindings propagate errors by default
pub const FIRE_ERRORS_ENV: &str = "BINDER_FIRE_ERRORS";

/// Environment variable overriding the maximum resolution depth
pub const MAX_DEPTH_ENV: &str = "BINDER_MAX_DEPTH";

const MAX_DEPTH_LIMIT: usize = 4096;

/// Tunables applied by a registry to the bindings it creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[builder]
pub struct RegistryConfig {
    /// Whether new bindings propagate resolution errors (`false` turns them into null results)
    #[builder(default = "true", getter)]
    pub fire_errors: bool,

    /// Maximum number of nested binding resolutions on one thread
    #[builder(default = "256", getter)]
    pub max_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fire_errors: true,
            max_depth: 256,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var(FIRE_ERRORS_ENV) {
            config.fire_errors = parse_bool(&value).ok_or_else(|| {
                ConfigError::invalid_value(FIRE_ERRORS_ENV, &value, "true or false")
            })?;
        }

        if let Ok(value) = env::var(MAX_DEPTH_ENV) {
            config.max_depth = value.trim().parse().map_err(|_| {
                ConfigError::invalid_value(MAX_DEPTH_ENV, &value, "a positive integer")
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        RangeValidator::new("max_depth", 1, MAX_DEPTH_LIMIT).validate(&self.max_depth)
    }
}

impl RegistryConfigBuilder {
    /// Verbose failures and a generous depth limit
    pub fn development() -> Self {
        RegistryConfigBuilder::new().fire_errors(true).max_depth(512)
    }

    /// Strict configuration with a shallow depth limit to surface runaway graphs early
    pub fn testing() -> Self {
        RegistryConfigBuilder::new().fire_errors(true).max_depth(64)
    }

    pub fn production() -> Self {
        RegistryConfigBuilder::new().fire_errors(true).max_depth(256)
    }

    /// Build and validate the configuration
    pub fn build_config(self) -> Result<RegistryConfig, ConfigError> {
        let config = self
            .build_with_defaults()
            .map_err(|e| ConfigError::BuilderError {
                message: format!("{:?}", e),
            })?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

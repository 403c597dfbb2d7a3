// config.rs - Configuration Loading

//! Configuration for the trust engine and its binaries.
//!
//! Sources, later ones overriding earlier ones:
//! - Built-in defaults
//! - An optional TOML/JSON/YAML file
//! - Environment variables prefixed `WOT` with `__` as separator,
//!   e.g. `WOT__TRUST__PATH_LIMITS__MAX_PATHS=100`

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::observability::{TracingConfig, TracingFormat};
use crate::trust::TrustConfig;

/// Prefix for configuration environment variables
pub const ENV_PREFIX: &str = "WOT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Logging section
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for this crate and its dependencies
    pub level: String,

    /// Output format
    pub format: TracingFormat,

    /// Full `EnvFilter` directive, overrides `level` when set
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: TracingFormat::Pretty,
            filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn tracing_config(&self) -> TracingConfig {
        let mut config = TracingConfig::for_level(&self.level, self.format);
        if let Some(filter) = &self.filter {
            config.filter = filter.clone();
        }
        config
    }
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WotConfig {
    pub trust: TrustConfig,
    pub logging: LoggingConfig,
}

impl WotConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: WotConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.trust.path_limits;
        if limits.max_depth == Some(0) {
            return Err(ConfigError::Invalid(
                "trust.path_limits.max_depth must be at least 1".into(),
            ));
        }
        if limits.max_paths == Some(0) {
            return Err(ConfigError::Invalid(
                "trust.path_limits.max_paths must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

//! Application configuration
//!
//! Settings are read from a TOML file and may be overridden by environment
//! variables such as `DUCK__CONTEXT__MAX_TOTAL_TOKENS=6000`. A `.env` file in
//! the working directory is loaded first when present.

use crate::context::ContextConfig;
use crate::error::Result;
use ::config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const ENV_PREFIX: &str = "DUCK";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load from a TOML file with environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dotenvy::dotenv().ok();
        debug!("Loading configuration from {}", path.display());

        let settings = ::config::Config::builder()
            .add_source(File::from(path))
            .add_source(environment())
            .build()?;
        Self::finish(settings)
    }

    /// Load from defaults and environment variables only
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let settings = ::config::Config::builder().add_source(environment()).build()?;
        Self::finish(settings)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: ::config::Config) -> Result<Self> {
        let config: Config = settings.try_deserialize()?;
        config.context.validate()?;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

//! # Arbor Configuration
//!
//! Layered configuration for the arbor JSON reader.
//!
//! Sources are merged in order, later ones winning:
//! built-in defaults, `config/arbor.yaml`, `config/<ARBOR_ENV>.yaml`,
//! then `ARBOR_*` environment variables (`__` separates sections).

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

mod error;
mod memory;
mod parser;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use memory::{AllocStrategyConfig, MemoryConfig};
pub use parser::{ParserConfig, PipelineConfig, PipelineModeConfig, TrailingInputPolicy};
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/arbor.yaml";
const ENV_PREFIX: &str = "ARBOR_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct ArborConfig {
    /// Parsing behavior and lexer/parser transport.
    #[serde(default)]
    #[validate(nested)]
    pub parser: ParserConfig,

    /// Node pool allocation.
    #[serde(default)]
    #[validate(nested)]
    pub memory: MemoryConfig,

    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl ArborConfig {
    /// Load configuration from the default files and the environment.
    ///
    /// Missing files are skipped. The merged result is validated before it
    /// is returned.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ArborConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        } else {
            debug!("{} not found, using default configuration", BASE_FILE);
        }

        let env = std::env::var("ARBOR_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file, still honoring `ARBOR_*`
    /// overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "configuration file missing");
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(ArborConfig::default())).merge(Yaml::file(path));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

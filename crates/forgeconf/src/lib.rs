//! Configuration loading for LogoForge.
//!
//! Every LogoForge crate reads its settings through this crate, so it keeps
//! its dependency list short.
//!
//! # Configuration Philosophy
//!
//! Configuration is split into two categories:
//!
//! - **Infrastructure** (`BackendConfig`, `TelemetryConfig`): where the
//!   generative backend lives, which models serve which tier, where traces go.
//!   Fixed for the life of the process.
//!
//! - **Stream** (`StreamConfig`): values that seed a live stream (tick
//!   interval, ring capacities, counter start). Each stream instance owns its
//!   state after startup.
//!
//! The backend credential is never read from a file. It comes from the
//! process environment via [`ApiKey::from_env`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use forgeconf::{ApiKey, ForgeConfig};
//!
//! let config = ForgeConfig::load().expect("Failed to load config");
//! let key = ApiKey::from_env().expect("GEMINI_API_KEY is not set");
//!
//! println!("Backend: {}", config.backend.base_url);
//! println!("Tick: {}ms", config.stream.tick_interval_ms);
//! # drop(key);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/logoforge/config.toml` (system)
//! 2. `~/.config/logoforge/config.toml` (user)
//! 3. `./logoforge.toml` (local override, or the `--config` path)
//! 4. Environment variables (`LOGOFORGE_*`)
//!
//! # Example Config
//!
//! ```toml
//! [backend]
//! base_url = "https://generativelanguage.googleapis.com"
//! timeout_ms = 60000
//! voice = "Kore"
//!
//! [backend.models]
//! fast = "gemini-3-flash-preview"
//! reasoning = "gemini-3-pro-preview"
//!
//! [stream]
//! tick_interval_ms = 2500
//! gallery_capacity = 60
//! log_capacity = 31
//!
//! [telemetry]
//! log_level = "info"
//! otlp_endpoint = "127.0.0.1:4317"
//! ```

pub mod credential;
pub mod infra;
pub mod loader;
pub mod stream;

pub use credential::ApiKey;
pub use infra::{BackendConfig, ModelsConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};
pub use stream::StreamConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Backend credential missing: set one of {}", tried.join(", "))]
    MissingCredential { tried: Vec<String> },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Complete LogoForge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForgeConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ForgeConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/logoforge/config.toml`
    /// 3. `~/.config/logoforge/config.toml`
    /// 4. `./logoforge.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./logoforge.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let mut config = loader::from_table(merged)?;
        loader::apply_env_overrides(&mut config, &mut sources);
        config.validate()?;

        Ok((config, sources))
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };

        if self.stream.tick_interval_ms == 0 {
            return invalid("stream.tick_interval_ms must be greater than zero");
        }
        if self.stream.gallery_capacity == 0 || self.stream.log_capacity == 0 {
            return invalid("stream ring capacities must be greater than zero");
        }
        if self.stream.initial_items > self.stream.gallery_capacity {
            return invalid("stream.initial_items cannot exceed stream.gallery_capacity");
        }
        if self.backend.sample_rate == 0 {
            return invalid("backend.sample_rate must be greater than zero");
        }
        if self.backend.channels == 0 {
            return invalid("backend.channels must be greater than zero");
        }
        if self.backend.base_url.trim().is_empty() {
            return invalid("backend.base_url cannot be empty");
        }

        Ok(())
    }
}

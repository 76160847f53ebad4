//! # configs
//!
//! Layered settings for the chirp binary.
//!
//! Precedence, lowest first: serde defaults, `config/default.toml`,
//! `config/local.toml`, then `CHIRP_`-prefixed environment variables with
//! `__` between nested keys (`CHIRP_SERVER__PORT=9000`). A `.env` file is
//! loaded into the environment before any of that.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub store: StoreSettings,
    pub suggestions: SuggestionSettings,
    pub posts: PostSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mounts `/api/admin/audit` and `/api/admin/repair`
    pub admin_routes: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            admin_routes: false,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// JSON snapshot loaded at startup and written on shutdown. In-memory only when unset.
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    pub pool_size: usize,
    pub count: usize,
    pub max_count: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            pool_size: 10,
            count: 4,
            max_count: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostSettings {
    /// Remove a deleted post from every liker's `liked_posts`
    pub cascade_unlike_on_delete: bool,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            cascade_unlike_on_delete: true,
        }
    }
}

impl Settings {
    /// Loads from `./config` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("loaded environment from {}", path.display());
        }
        Self::load_from("config")
    }

    /// Loads with `dir` as the configuration directory.
    pub fn load_from(dir: &str) -> Result<Self, ConfigError> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/local")).required(false))
            .add_source(
                config::Environment::with_prefix("CHIRP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.suggestions;
        if s.pool_size == 0 {
            return Err(ConfigError::Invalid("suggestions.pool_size must be at least 1".into()));
        }
        if s.count == 0 {
            return Err(ConfigError::Invalid("suggestions.count must be at least 1".into()));
        }
        if s.max_count > s.pool_size {
            return Err(ConfigError::Invalid(
                "suggestions.max_count cannot exceed suggestions.pool_size".into(),
            ));
        }
        if s.count > s.max_count {
            return Err(ConfigError::Invalid(
                "suggestions.count cannot exceed suggestions.max_count".into(),
            ));
        }
        Ok(())
    }
}

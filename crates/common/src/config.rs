//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Media storage configuration.
    #[serde(default)]
    pub media: MediaConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
    /// Whether permissive CORS is enabled.
    #[serde(default)]
    pub cors: bool,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when connecting to or acquiring from the pool.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session token lifetime in seconds.
    #[serde(default = "default_token_max_age")]
    pub token_max_age: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_max_age: default_token_max_age(),
        }
    }
}

/// Media storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory where uploaded files are stored.
    #[serde(default = "default_media_dir")]
    pub directory: PathBuf,
    /// URL path prefix under which files are served.
    #[serde(default = "default_media_url")]
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            directory: default_media_dir(),
            base_url: default_media_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_connect_timeout() -> u64 {
    10
}

// One week.
const fn default_token_max_age() -> i64 {
    604_800
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("./data/media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `VERDANT_ENV`)
    /// 3. Environment variables with `VERDANT_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("VERDANT_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VERDANT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("VERDANT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(default_port(), 3000);
        assert_eq!(default_host(), "0.0.0.0");

        let media = MediaConfig::default();
        assert_eq!(media.base_url, "/media");

        let session = SessionConfig::default();
        assert_eq!(session.token_max_age, 604_800);
    }
}

//! For reading application configuration.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server address.
    pub http_address: String,
    /// Server http port.
    pub http_port: u16,
    /// How long a single request may take before it is aborted.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// The maximum number of requests handled at the same time.
    pub concurrency_limit: usize,
    /// Origins allowed to call the API from a browser. `"*"` allows any.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_address: "127.0.0.1".to_string(),
            http_port: 8000,
            request_timeout: Duration::from_secs(10),
            concurrency_limit: 500,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Where items are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A PostgreSQL database.
    #[default]
    Postgres,
    /// Process memory. Everything is lost on restart.
    Memory,
}

/// Database configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// The storage backend to use.
    pub backend: StorageBackend,
    /// The database username.
    pub username: String,
    /// The database password.
    pub password: String,
    /// The database port.
    pub port: u16,
    /// The database name.
    pub database_name: String,
    /// The database host.
    pub host: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            port: 5432,
            database_name: "items".to_string(),
            host: "localhost".to_string(),
            max_connections: 20,
        }
    }
}

/// Retrieve [`Config`] from the default configuration file,
/// overridden by `APP__`-prefixed environment variables.
#[tracing::instrument]
pub fn load_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("app")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

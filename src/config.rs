//! Command-line and environment configuration.
//!
//! Every option can also be set through an `ELECTION_*` variable, and a
//! `.env` file in the working directory is loaded before parsing.

use axum::http::HeaderValue;
use clap::Args;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:election_data2.db";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Host must not be empty")]
    MissingHost,

    #[error("Invalid database URL format: expected sqlite:<path>, got {0}")]
    InvalidDatabaseUrl(String),

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// SQLite database holding the election_results table
    #[clap(
        long = "database",
        env = "ELECTION_DB",
        default_value = DEFAULT_DATABASE_URL
    )]
    pub url: String,
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.url.strip_prefix("sqlite:") {
            Some(path) if !path.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidDatabaseUrl(self.url.clone())),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Host address to bind to
    #[clap(long, env = "ELECTION_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[clap(long, env = "ELECTION_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Allowed CORS origins, comma-separated. Any origin when unset.
    #[clap(long, env = "ELECTION_CORS_ORIGINS")]
    pub cors_origins: Option<String>,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        for origin in self.cors_origins_list() {
            let well_formed = (origin.starts_with("http://") || origin.starts_with("https://"))
                && HeaderValue::from_str(&origin).is_ok();
            if !well_formed {
                return Err(ConfigError::InvalidCorsOrigin(origin));
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origins: None,
        }
    }
}

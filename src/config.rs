//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Authentication configuration
///
/// Access tokens are HMAC-signed by the identity provider with a
/// shared secret; no server-side session storage is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret (32+ bytes, shared with the identity provider)
    pub token_secret: String,
}

/// Movie catalog (metadata provider) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the metadata API
    pub base_url: String,
    /// API key sent as a bearer token to the provider
    pub api_key: String,
    /// Response language, e.g. "uk-UA"
    pub language: String,
}

/// Streaming-source scraping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Proxy URLs tried before falling back to a direct request
    #[serde(default)]
    pub proxies: Vec<String>,
    /// Attempts through proxies before the direct fallback
    pub proxy_retries: u32,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached catalog responses
    pub catalog_max_items: u64,
    /// TTL for catalog search responses in seconds
    pub search_ttl: u64,
    /// TTL for catalog detail responses in seconds
    pub details_ttl: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (KINOTRACK_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "data/kinotrack.db")?
            .set_default("catalog.base_url", "https://api.themoviedb.org/3")?
            .set_default("catalog.language", "uk-UA")?
            .set_default("sources.proxy_retries", 2)?
            .set_default("sources.request_timeout_seconds", 15)?
            .set_default("cache.catalog_max_items", 2000)?
            .set_default("cache.search_ttl", 3600)?
            .set_default("cache.details_ttl", 86400)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("KINOTRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_TOKEN_SECRET_BYTES: usize = 32;

        if self.auth.token_secret.as_bytes().len() < MIN_TOKEN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_secret must be at least {} bytes",
                MIN_TOKEN_SECRET_BYTES
            )));
        }

        if self.catalog.api_key.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "catalog.api_key must not be empty".to_string(),
            ));
        }

        if url::Url::parse(&self.catalog.base_url).is_err() {
            return Err(crate::error::AppError::Config(format!(
                "catalog.base_url is not a valid URL: {}",
                self.catalog.base_url
            )));
        }

        for proxy in &self.sources.proxies {
            if url::Url::parse(proxy).is_err() {
                return Err(crate::error::AppError::Config(format!(
                    "sources.proxies entry is not a valid URL: {}",
                    proxy
                )));
            }
        }

        Ok(())
    }
}

impl From<config::ConfigError> for crate::error::AppError {
    fn from(err: config::ConfigError) -> Self {
        crate::error::AppError::Config(err.to_string())
    }
}

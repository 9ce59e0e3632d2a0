//! Configuration for the ontology service.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("failed to read token secret file: {0}")]
    SecretFile(#[from] std::io::Error),

    #[error("token secret required: set auth.token_secret or PRODGRAPH__AUTH__TOKEN_SECRET")]
    MissingSecret,
}

/// Top-level service configuration.
///
/// Loaded from `prodgraph.toml` or `PRODGRAPH__` environment variables
/// (e.g. `PRODGRAPH__AUTH__TOKEN_SECRET`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub pagination: PaginationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret, at least 32 bytes. Required for startup.
    #[serde(default)]
    pub token_secret: String,

    /// Optional file to read the secret from instead; takes precedence
    /// over `token_secret` when set.
    #[serde(default)]
    pub token_secret_file: Option<String>,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_audience")]
    pub audience: String,

    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    /// Page size applied when the caller passes none.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Hard cap; larger requests are clamped, not rejected.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl ServiceConfig {
    /// Load from `<file_prefix>.toml` (optional) and environment.
    pub fn load(file_prefix: &str) -> Result<Self, ConfigError> {
        let cfg = ::config::Config::builder()
            .add_source(::config::File::with_name(file_prefix).required(false))
            .add_source(
                ::config::Environment::with_prefix("PRODGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    /// Resolve the token secret, preferring the secret file when set.
    pub fn token_secret(&self) -> Result<String, ConfigError> {
        if let Some(path) = &self.auth.token_secret_file {
            let raw = std::fs::read_to_string(path)?;
            return Ok(raw.trim().to_string());
        }
        if self.auth.token_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(self.auth.token_secret.clone())
    }
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_query_timeout() -> u64 {
    10
}

fn default_issuer() -> String {
    "prodgraph".to_string()
}

fn default_audience() -> String {
    "prodgraph-clients".to_string()
}

fn default_token_ttl() -> u64 {
    24 * 60 * 60
}

fn default_page_size() -> u32 {
    50
}

fn default_max_page_size() -> u32 {
    1000
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_secret_file: None,
            issuer: default_issuer(),
            audience: default_audience(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            neo4j: Neo4jSettings::default(),
            auth: AuthSettings::default(),
            pagination: PaginationSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ServiceConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.pagination.default_page_size, 50);
        assert_eq!(config.pagination.max_page_size, 1000);
        assert_eq!(config.auth.token_ttl_secs, 86400);
    }

    #[test]
    fn missing_secret_is_refused() {
        let config = ServiceConfig::default();
        let err = config.token_secret().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret));
    }
}

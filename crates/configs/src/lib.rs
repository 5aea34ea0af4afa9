//! # configs
//!
//! Layered client configuration: an optional `redclone.toml`, then
//! `REDCLONE__SECTION__KEY` environment variables (a `.env` file is loaded
//! first when present).

use std::path::PathBuf;

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "REDCLONE";
pub const DEFAULT_FILE: &str = "redclone";
/// Longest lifetime S3 accepts for a presigned URL (seven days).
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Managed GraphQL endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    /// Key used for public reads.
    pub api_key: SecretString,
}

/// Hosted user pool.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub region: String,
    pub client_id: String,
    /// Overrides the regional identity endpoint (local emulators, tests).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// File holding the refresh token between runs. No persistence when unset.
    #[serde(default)]
    pub token_cache: Option<PathBuf>,
}

impl AuthConfig {
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Access-level prefix every key is stored under.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}

fn default_key_prefix() -> String {
    "public/".to_string()
}

fn default_signed_url_ttl() -> u64 {
    900
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Loads `.env`, `redclone.toml` (optional) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_config(
            Config::builder()
                .add_source(File::with_name(DEFAULT_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"))
                .build()?,
        )
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let cfg: AppConfig = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("api.endpoint", self.api.endpoint.as_str()),
            ("api.api_key", self.api.api_key.expose_secret()),
            ("auth.region", self.auth.region.as_str()),
            ("auth.client_id", self.auth.client_id.as_str()),
            ("storage.bucket", self.storage.bucket.as_str()),
            ("storage.region", self.storage.region.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("{name} must not be empty")));
        }
        let ttl = self.storage.signed_url_ttl_secs;
        if ttl == 0 || ttl > MAX_SIGNED_URL_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "storage.signed_url_ttl_secs must be between 1 and {MAX_SIGNED_URL_TTL_SECS}, got {ttl}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const SAMPLE: &str = r#"
        [api]
        endpoint = "https://example.appsync-api.us-east-1.amazonaws.com/graphql"
        api_key = "da2-secret"

        [auth]
        region = "us-east-1"
        client_id = "client123"

        [storage]
        bucket = "images-bucket"
        region = "us-east-1"
    "#;

    fn parse(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_config(
            Config::builder()
                .add_source(File::from_str(toml, FileFormat::Toml))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let cfg = parse(SAMPLE).unwrap();
        assert_eq!(cfg.storage.key_prefix, "public/");
        assert_eq!(cfg.storage.signed_url_ttl_secs, 900);
        assert_eq!(cfg.log.filter, "info");
        assert_eq!(cfg.auth.endpoint_url(), "https://cognito-idp.us-east-1.amazonaws.com/");
        assert!(cfg.auth.token_cache.is_none());
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let cfg = parse(SAMPLE).unwrap();
        assert!(!format!("{:?}", cfg.api).contains("da2-secret"));
        assert_eq!(cfg.api.api_key.expose_secret(), "da2-secret");
    }

    #[test]
    fn signed_url_ttl_is_bounded_by_s3_limit() {
        let at_limit = format!("{SAMPLE}\nsigned_url_ttl_secs = {MAX_SIGNED_URL_TTL_SECS}\n");
        assert_eq!(parse(&at_limit).unwrap().storage.signed_url_ttl_secs, MAX_SIGNED_URL_TTL_SECS);

        let too_long = format!("{SAMPLE}\nsigned_url_ttl_secs = {}\n", MAX_SIGNED_URL_TTL_SECS + 1);
        assert!(matches!(parse(&too_long), Err(ConfigError::Invalid(msg)) if msg.contains("signed_url_ttl_secs")));

        let zero = format!("{SAMPLE}\nsigned_url_ttl_secs = 0\n");
        assert!(parse(&zero).is_err());
    }

    #[test]
    fn empty_bucket_is_rejected() {
        let broken = SAMPLE.replace("images-bucket", "");
        assert!(matches!(parse(&broken), Err(ConfigError::Invalid(msg)) if msg.contains("storage.bucket")));
    }
}

//! Application configuration loaded from environment variables.
//!
//! A profile (`APP_ENV`, default `development`) selects an optional
//! `.env.<profile>` file which is loaded before the plain `.env` file.
//! Variables already present in the process environment always win.

use crate::services::token::{TokenConfig, DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};
use ring::rand::{SecureRandom, SystemRandom};
use std::env;
use std::str::FromStr;

/// Default scope granted when a token request does not name one.
pub const DEFAULT_SCOPE: &str = "all";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Active configuration profile (`development`, `production`, ...)
    pub profile: String,
    /// Server port
    pub port: u16,
    /// Admin UI origin, allowed by CORS
    pub frontend_url: String,
    /// Postgres connection settings; `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,
    /// Token signing and lifetime settings
    pub token: TokenConfig,
    /// OAuth client id accepted by the mock token endpoint
    pub mock_app_id: String,
    /// OAuth client secret accepted by the mock token endpoint
    pub mock_app_secret: String,
    /// Shared key for `/admin/*`; admin routes are open when unset
    pub admin_api_key: Option<String>,
}

/// Postgres connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            profile: "test".to_string(),
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            database: None,
            token: TokenConfig {
                secret: b"test_token_secret_32_bytes_min!!".to_vec(),
                access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
                refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
                default_scope: vec![DEFAULT_SCOPE.to_string()],
            },
            mock_app_id: "mock_app_id".to_string(),
            mock_app_secret: "mock_app_secret".to_string(),
            admin_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` files).
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        dotenvy::from_filename(format!(".env.{profile}")).ok();
        dotenvy::dotenv().ok(); // Load .env file if present

        let database = match non_empty_var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
                acquire_timeout_secs: parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
            }),
            None => None,
        };

        let secret = match non_empty_var("TOKEN_SECRET") {
            Some(secret) => secret.into_bytes(),
            None => {
                tracing::warn!(
                    profile = %profile,
                    "TOKEN_SECRET not set; using a generated development-only secret. \
                     Tokens will not survive a restart."
                );
                generate_dev_secret()?
            }
        };

        let access_ttl_secs = parse_var("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl_secs = parse_var("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS)?;
        if access_ttl_secs == 0 {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECS"));
        }
        if refresh_ttl_secs == 0 {
            return Err(ConfigError::Invalid("REFRESH_TOKEN_TTL_SECS"));
        }

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            database,
            token: TokenConfig {
                secret,
                access_ttl_secs,
                refresh_ttl_secs,
                default_scope: vec![DEFAULT_SCOPE.to_string()],
            },
            mock_app_id: env::var("MOCK_APP_ID").unwrap_or_else(|_| "mock_app_id".to_string()),
            mock_app_secret: env::var("MOCK_APP_SECRET")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| "mock_app_secret".to_string()),
            admin_api_key: non_empty_var("ADMIN_API_KEY"),
            profile,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

/// Random 32-byte secret, hex encoded.
fn generate_dev_secret() -> Result<Vec<u8>, ConfigError> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| ConfigError::Random)?;
    Ok(hex::encode(bytes).into_bytes())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Failed to generate a development token secret")]
    Random,
}

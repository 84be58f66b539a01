//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development. Nothing here is hard-coded:
//! the JWT secret, database credentials and upstream endpoints all come
//! from the environment.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    /// Shared secret that signs and verifies the bearer credential.
    pub jwt_secret: String,
    /// Bounded timeout applied to every upstream platform call; several
    /// scrape targets have no SLA, so requests must not wait on them.
    pub upstream_timeout: Duration,
    pub youtube_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub coach_model: String,
    // Upstream base URLs, overridable so tests can point the adapters at a
    // local mock server.
    pub leetcode_base_url: String,
    pub hackerrank_base_url: String,
    pub youtube_base_url: String,
    pub udemy_base_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure
    /// tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5001".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingVar("JWT_SECRET".to_string()))?;

        let timeout_secs_str =
            std::env::var("UPSTREAM_TIMEOUT_SECS").unwrap_or_else(|_| "8".to_string());
        let timeout_secs = timeout_secs_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("UPSTREAM_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        // --- API keys (optional; adapters degrade without them) ---
        let youtube_api_key = std::env::var("YOUTUBE_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok();
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        let coach_model =
            std::env::var("COACH_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let leetcode_base_url = std::env::var("LEETCODE_BASE_URL")
            .unwrap_or_else(|_| "https://leetcode.com".to_string());
        let hackerrank_base_url = std::env::var("HACKERRANK_BASE_URL")
            .unwrap_or_else(|_| "https://www.hackerrank.com".to_string());
        let youtube_base_url = std::env::var("YOUTUBE_BASE_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string());
        let udemy_base_url = std::env::var("UDEMY_BASE_URL")
            .unwrap_or_else(|_| "https://www.udemy.com".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            jwt_secret,
            upstream_timeout: Duration::from_secs(timeout_secs),
            youtube_api_key,
            openai_api_key,
            coach_model,
            leetcode_base_url,
            hackerrank_base_url,
            youtube_base_url,
            udemy_base_url,
        })
    }
}

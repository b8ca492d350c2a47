use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use telegram_auth::AuthConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Upper bound for one `/telegram` call, all remote hops included
    pub request_timeout: Duration,
    pub telegram: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            ),
            telegram: AuthConfig::from_env().context("invalid Telegram configuration")?,
        })
    }
}

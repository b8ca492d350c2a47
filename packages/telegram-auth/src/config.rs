//! Client configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AuthError, Result};
use crate::session::MAX_SESSION_WINDOW;

/// Base URL of Telegram's login widget service.
pub const OAUTH_URL: &str = "https://oauth.telegram.org/";

/// Desktop browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/93.0.4606.81 Safari/537.36";

/// Settings for a [`TelegramAuth`](crate::TelegramAuth) client.
///
/// Built once at startup and owned by the client; nothing here is global.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Numeric id of the bot the login widget is registered for
    pub bot_id: i64,
    /// Site domain the widget is embedded on (without scheme)
    pub domain: String,
    /// Remote base URL, always ending in `/`
    pub oauth_url: String,
    pub user_agent: String,
    /// How long an identity's cookies live after their last use
    pub session_ttl: Duration,
    /// How often the reaper sweeps expired sessions
    pub reap_interval: Duration,
    /// Maximum `302` hops followed for one request
    pub max_redirects: usize,
    /// Deadline for a single HTTP exchange
    pub request_timeout: Duration,
}

impl AuthConfig {
    pub fn new(bot_id: i64, domain: impl Into<String>) -> Self {
        Self {
            bot_id,
            domain: domain.into(),
            oauth_url: OAUTH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_ttl: Duration::from_secs(60),
            reap_interval: Duration::from_secs(10),
            max_redirects: 10,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `TELEGRAM_BOT_ID` and `TELEGRAM_DOMAIN` are required. Optional overrides:
    /// `TELEGRAM_OAUTH_URL`, `TELEGRAM_SESSION_TTL_SECS`,
    /// `TELEGRAM_REAP_INTERVAL_SECS`, `TELEGRAM_MAX_REDIRECTS`,
    /// `TELEGRAM_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let bot_id = env_parse::<i64>("TELEGRAM_BOT_ID")?
            .ok_or_else(|| AuthError::Config("TELEGRAM_BOT_ID not set".into()))?;
        let domain = env::var("TELEGRAM_DOMAIN")
            .map_err(|_| AuthError::Config("TELEGRAM_DOMAIN not set".into()))?;

        let mut config = Self::new(bot_id, domain);
        if let Ok(url) = env::var("TELEGRAM_OAUTH_URL") {
            config = config.with_oauth_url(url);
        }
        if let Some(secs) = env_parse::<u64>("TELEGRAM_SESSION_TTL_SECS")? {
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("TELEGRAM_REAP_INTERVAL_SECS")? {
            config.reap_interval = Duration::from_secs(secs);
        }
        if let Some(hops) = env_parse::<usize>("TELEGRAM_MAX_REDIRECTS")? {
            config.max_redirects = hops;
        }
        if let Some(secs) = env_parse::<u64>("TELEGRAM_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Point the client at a different remote (proxies, local mocks).
    pub fn with_oauth_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.oauth_url = url;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = interval;
        self
    }

    pub fn with_max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `https://<domain>`, sent as `origin`/`referer` and as the `origin` query parameter.
    pub fn origin(&self) -> String {
        format!("https://{}", self.domain)
    }

    /// Parsed remote base URL.
    pub fn oauth_base(&self) -> Result<Url> {
        Url::parse(&self.oauth_url)
            .map_err(|e| AuthError::Config(format!("invalid oauth url {}: {}", self.oauth_url, e)))
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.bot_id <= 0 {
            return Err(AuthError::Config(format!(
                "bot id must be positive, got {}",
                self.bot_id
            )));
        }
        let domain = self.domain.trim();
        if domain.is_empty() || domain.contains(char::is_whitespace) {
            return Err(AuthError::Config(format!(
                "origin domain is empty or malformed: {:?}",
                self.domain
            )));
        }
        let base = self.oauth_base()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AuthError::Config(format!(
                "oauth url must be http(s): {}",
                self.oauth_url
            )));
        }
        if self.session_ttl.is_zero() || self.reap_interval.is_zero() {
            return Err(AuthError::Config(
                "session ttl and reap interval must be non-zero".into(),
            ));
        }
        if self.session_ttl > MAX_SESSION_WINDOW || self.reap_interval > MAX_SESSION_WINDOW {
            return Err(AuthError::Config(format!(
                "session ttl and reap interval must not exceed {}s",
                MAX_SESSION_WINDOW.as_secs()
            )));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AuthError::Config(format!("{} is invalid: {}", key, e))),
        Err(_) => Ok(None),
    }
}

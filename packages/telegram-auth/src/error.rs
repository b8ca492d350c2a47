//! Error types for the Telegram login handshake.

use thiserror::Error;

/// Result type for Telegram auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Telegram auth errors.
///
/// The `Display` text of each variant is what callers see in
/// [`ConfirmationResult::error`](crate::ConfirmationResult::error).
#[derive(Debug, Error)]
pub enum AuthError {
    /// Configuration error (missing bot id, empty domain, bad base URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, DNS, timeout, body read)
    #[error("Network error: {0}")]
    Transport(String),

    /// The remote kept redirecting past the configured hop limit
    #[error("Network error: stopped after {limit} redirects at {url}")]
    TooManyRedirects { limit: usize, url: String },

    /// The caller's cancellation token fired mid-request
    #[error("request cancelled")]
    Cancelled,

    /// The user declined the login request on their phone
    #[error("{0}")]
    Declined(String),

    /// The push request was answered with something other than `true`
    #[error("{0}")]
    Rejected(String),

    /// Hash or profile scraping failed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AuthError {
    /// True for the transport class of failures (network, redirects, cancellation).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AuthError::Transport(_) | AuthError::TooManyRedirects { .. } | AuthError::Cancelled
        )
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Transport(format!("request timed out: {}", err))
        } else {
            AuthError::Transport(err.to_string())
        }
    }
}

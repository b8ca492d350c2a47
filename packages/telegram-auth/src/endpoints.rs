//! Remote endpoint URLs.
//!
//! Paths and query parameters must match oauth.telegram.org exactly; the
//! `origin` parameter carries `https://<domain>` verbatim, unescaped.

use reqwest::Method;

use crate::config::AuthConfig;

/// One of the five login-widget endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Push a login request to the phone
    Request,
    /// Poll whether the user accepted
    Login,
    /// Page carrying the confirmation hash
    Auth,
    /// Confirm the session with the scraped hash
    Confirm,
    /// Page embedding the user profile JSON
    Push,
}

impl Endpoint {
    pub fn method(self) -> Method {
        match self {
            Endpoint::Request | Endpoint::Login => Method::POST,
            Endpoint::Auth | Endpoint::Confirm | Endpoint::Push => Method::GET,
        }
    }

    /// Full URL for every endpoint except [`Endpoint::Confirm`], which also
    /// needs a hash (see [`confirm_url`]).
    pub fn url(self, config: &AuthConfig) -> String {
        let base = &config.oauth_url;
        let bot = config.bot_id;
        let origin = config.origin();
        match self {
            Endpoint::Request => format!(
                "{base}auth/request?bot_id={bot}&origin={origin}&embed=1&request_access=write"
            ),
            Endpoint::Login => format!(
                "{base}auth/login?bot_id={bot}&origin={origin}&embed=1&request_access=write"
            ),
            Endpoint::Auth => format!(
                "{base}auth?bot_id={bot}&origin={origin}&embed=0&request_access=write"
            ),
            Endpoint::Confirm => format!(
                "{base}auth/auth?bot_id={bot}&origin={origin}&request_access=write&confirm=1"
            ),
            Endpoint::Push => format!(
                "{base}auth/push?bot_id={bot}&origin={origin}&request_access=write"
            ),
        }
    }
}

/// Confirm URL with the scraped hash appended as a raw query suffix.
pub fn confirm_url(config: &AuthConfig, hash: &str) -> String {
    format!("{}&hash={}", Endpoint::Confirm.url(config), hash)
}

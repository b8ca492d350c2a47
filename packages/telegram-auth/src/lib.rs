//! Telegram login-widget phone confirmation over plain HTTP
//!
//! Drives the oauth.telegram.org handshake the way a browser would: push a
//! login request to the user's phone, poll until they accept, confirm the
//! session, then scrape the authenticated profile. Telegram keeps handshake
//! state in its own cookies, so the client caches them per phone number.
//!
//! # Example
//!
//! ```rust,ignore
//! use telegram_auth::{AuthConfig, TelegramAuth, WorkflowStatus};
//!
//! let auth = TelegramAuth::new(AuthConfig::new(12345678, "example.com"))?;
//!
//! let pushed = auth.send_push("79000000000").await;
//! if pushed.status == WorkflowStatus::Success {
//!     // poll until the user answers on their phone
//!     let result = auth.check_acceptance("79000000000").await;
//!     println!("{}", serde_json::to_string(&result)?);
//! }
//! ```

pub mod config;
pub mod endpoints;
pub mod error;
pub mod scrape;
pub mod session;
pub mod transport;
pub mod types;
mod workflow;

pub use config::{AuthConfig, OAUTH_URL};
pub use endpoints::Endpoint;
pub use error::{AuthError, Result};
pub use scrape::{extract_hash, extract_profile};
pub use session::{
    merge_cookies, CookieJar, SessionEntry, SessionStore, DELETED_COOKIE, MAX_SESSION_WINDOW,
};
pub use transport::Transport;
pub use types::{ConfirmationResult, UserProfile, WorkflowStatus};
pub use workflow::DECLINED_MESSAGE;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::workflow::Confirmation;

/// Telegram login client.
///
/// Cheap to clone; clones share one session store and one reaper. The reaper
/// stops on [`shutdown`](Self::shutdown) or when the last clone is dropped.
#[derive(Clone)]
pub struct TelegramAuth {
    inner: Arc<Inner>,
}

struct Inner {
    config: AuthConfig,
    transport: Transport,
    shutdown: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl TelegramAuth {
    /// Validate `config`, build the HTTP transport and start the session reaper.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn new(config: AuthConfig) -> Result<Self> {
        Self::with_shutdown(config, CancellationToken::new())
    }

    /// Like [`new`](Self::new), with the reaper also stopping when `parent`
    /// is cancelled. Dropping the client never cancels `parent` itself.
    pub fn with_shutdown(config: AuthConfig, parent: CancellationToken) -> Result<Self> {
        config.validate()?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(AuthError::Config(
                "TelegramAuth must be created inside a Tokio runtime".into(),
            ));
        }

        let shutdown = parent.child_token();
        let sessions = SessionStore::new(config.session_ttl);
        let transport = Transport::new(&config, sessions.clone())?;
        sessions.spawn_reaper(config.reap_interval, shutdown.clone());

        info!(
            bot_id = config.bot_id,
            domain = %config.domain,
            "telegram auth client ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                transport,
                shutdown,
            }),
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    pub fn sessions(&self) -> &SessionStore {
        self.inner.transport.sessions()
    }

    /// Stop the session reaper. Workflow calls keep working.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    /// Push a login request to the Telegram account linked to `phone`.
    pub async fn send_push(&self, phone: &str) -> ConfirmationResult {
        self.send_push_with_cancel(phone, &CancellationToken::new())
            .await
    }

    pub async fn send_push_with_cancel(
        &self,
        phone: &str,
        cancel: &CancellationToken,
    ) -> ConfirmationResult {
        self.confirmation(phone, cancel).send_push().await
    }

    /// Check whether the user accepted and, if so, finish the login and
    /// return their profile. `Pending` means ask again later.
    pub async fn check_acceptance(&self, phone: &str) -> ConfirmationResult {
        self.check_acceptance_with_cancel(phone, &CancellationToken::new())
            .await
    }

    pub async fn check_acceptance_with_cancel(
        &self,
        phone: &str,
        cancel: &CancellationToken,
    ) -> ConfirmationResult {
        self.confirmation(phone, cancel).check_acceptance().await
    }

    fn confirmation<'a>(
        &'a self,
        phone: &'a str,
        cancel: &'a CancellationToken,
    ) -> Confirmation<'a> {
        Confirmation::new(&self.inner.config, &self.inner.transport, phone, cancel)
    }
}

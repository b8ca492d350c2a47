//! Confirmation workflow.
//!
//! ```text
//! send_push:        auth/request ─► "true" ? success : cancel
//!
//! check_acceptance: auth/login ──► "true"      ─► continue
//!                                  declined    ─► cancel
//!                                  anything else ─► pending (caller polls)
//!                   auth       ──► scrape hash ─► missing? cancel
//!                   auth/auth  ──► confirm with hash
//!                   auth/push  ──► scrape profile ─► success
//! ```
//!
//! Every failure short-circuits the remaining steps and surfaces as
//! `Cancelled` with the error text.

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::endpoints::{confirm_url, Endpoint};
use crate::error::{AuthError, Result};
use crate::scrape::{extract_hash, extract_profile};
use crate::transport::Transport;
use crate::types::{ConfirmationResult, UserProfile};

/// Body the login poll returns when the user pressed "Decline".
pub const DECLINED_MESSAGE: &str = "Declined by the user";

/// Login poll answer that is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acceptance {
    Accepted,
    Waiting,
}

/// One workflow invocation for one phone number.
pub(crate) struct Confirmation<'a> {
    config: &'a AuthConfig,
    transport: &'a Transport,
    phone: &'a str,
    cancel: &'a CancellationToken,
}

impl<'a> Confirmation<'a> {
    pub(crate) fn new(
        config: &'a AuthConfig,
        transport: &'a Transport,
        phone: &'a str,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            transport,
            phone,
            cancel,
        }
    }

    pub(crate) async fn send_push(&self) -> ConfirmationResult {
        match self.request_push().await {
            Ok(()) => {
                info!(phone = self.phone, "login request pushed");
                ConfirmationResult::success(self.phone, None)
            }
            Err(e) => {
                info!(phone = self.phone, error = %e, "login request not pushed");
                ConfirmationResult::cancelled(self.phone, &e)
            }
        }
    }

    pub(crate) async fn check_acceptance(&self) -> ConfirmationResult {
        match self.run_confirmation().await {
            Ok(Some(user)) => {
                info!(phone = self.phone, user_id = user.id, "login confirmed");
                ConfirmationResult::success(self.phone, Some(user))
            }
            Ok(None) => {
                debug!(phone = self.phone, "login still pending");
                ConfirmationResult::pending(self.phone)
            }
            Err(e) => {
                info!(phone = self.phone, error = %e, "login cancelled");
                ConfirmationResult::cancelled(self.phone, &e)
            }
        }
    }

    async fn run_confirmation(&self) -> Result<Option<UserProfile>> {
        if self.poll_login().await? == Acceptance::Waiting {
            return Ok(None);
        }
        let hash = self.fetch_hash().await?;
        self.confirm(&hash).await?;
        self.fetch_profile().await.map(Some)
    }

    async fn call(&self, url: &str, method: Method, body: Option<&str>) -> Result<String> {
        let bytes = self
            .transport
            .send(url, method, body, self.phone, self.cancel)
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn request_push(&self) -> Result<()> {
        let form = format!("phone={}", urlencoding::encode(self.phone));
        let body = self
            .call(
                &Endpoint::Request.url(self.config),
                Endpoint::Request.method(),
                Some(&form),
            )
            .await?;

        match body.parse::<bool>() {
            Ok(true) => Ok(()),
            _ => Err(AuthError::Rejected(body)),
        }
    }

    async fn poll_login(&self) -> Result<Acceptance> {
        let body = self
            .call(&Endpoint::Login.url(self.config), Endpoint::Login.method(), None)
            .await?;

        match body.as_str() {
            "true" => Ok(Acceptance::Accepted),
            DECLINED_MESSAGE => Err(AuthError::Declined(DECLINED_MESSAGE.to_string())),
            _ => Ok(Acceptance::Waiting),
        }
    }

    async fn fetch_hash(&self) -> Result<String> {
        let body = self
            .call(&Endpoint::Auth.url(self.config), Endpoint::Auth.method(), None)
            .await?;

        extract_hash(&body)
            .ok_or_else(|| AuthError::Parse("confirmation hash not found".into()))
    }

    async fn confirm(&self, hash: &str) -> Result<()> {
        self.call(
            &confirm_url(self.config, hash),
            Endpoint::Confirm.method(),
            None,
        )
        .await?;
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<UserProfile> {
        let body = self
            .call(&Endpoint::Push.url(self.config), Endpoint::Push.method(), None)
            .await?;

        let mut user = extract_profile(&body)?;
        user.phone = self.phone.to_string();
        Ok(user)
    }
}

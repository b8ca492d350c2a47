//! Browser-like HTTP exchange with per-identity cookies.

use bytes::Bytes;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::session::{CookieJar, SessionStore};

/// Issues requests on behalf of an identity, carrying its cookies.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: Client,
    sessions: SessionStore,
    base: Url,
    origin: String,
    max_redirects: usize,
}

impl Transport {
    pub fn new(config: &AuthConfig, sessions: SessionStore) -> Result<Self> {
        // Redirects are followed by hand so each hop carries the identity's cookies.
        let http_client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AuthError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            sessions,
            base: config.oauth_base()?,
            origin: config.origin(),
            max_redirects: config.max_redirects,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Send one request as `identity` and return the final response body.
    ///
    /// `302` responses are followed against the remote base with the same
    /// method and body, up to the configured hop limit. The first non-redirect
    /// response, whatever its status, has its cookies merged into the
    /// identity's session before the body is read.
    pub async fn send(
        &self,
        url: &str,
        method: Method,
        body: Option<&str>,
        identity: &str,
        cancel: &CancellationToken,
    ) -> Result<Bytes> {
        let mut url = url.to_string();
        let mut hops = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(AuthError::Cancelled);
            }

            let cookies = self.sessions.get(identity).unwrap_or_default();
            let request = self.build_request(&url, method.clone(), body, &cookies);

            debug!(%method, url = %url, identity, hop = hops, "telegram request");

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                result = request.send() => result.map_err(|e| {
                    warn!(error = %e, url = %url, "telegram request failed");
                    AuthError::from(e)
                })?,
            };

            if response.status() == StatusCode::FOUND {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        AuthError::Transport(format!("redirect without Location from {}", url))
                    })?;

                if hops >= self.max_redirects {
                    warn!(url = %url, limit = self.max_redirects, "redirect limit reached");
                    return Err(AuthError::TooManyRedirects {
                        limit: self.max_redirects,
                        url,
                    });
                }

                let next = self.resolve_location(location)?;
                debug!(from = %url, to = %next, "following redirect");
                url = next;
                hops += 1;
                continue;
            }

            let fresh: Vec<(String, String)> = response
                .cookies()
                .map(|c| (c.name().to_string(), c.value().to_string()))
                .collect();
            if !fresh.is_empty() {
                debug!(identity, count = fresh.len(), "storing session cookies");
            }
            self.sessions.merge(identity, fresh);

            let status = response.status();
            let bytes = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                result = response.bytes() => result.map_err(AuthError::from)?,
            };

            debug!(url = %url, status = %status, len = bytes.len(), "telegram response");
            return Ok(bytes);
        }
    }

    fn build_request(
        &self,
        url: &str,
        method: Method,
        body: Option<&str>,
        cookies: &CookieJar,
    ) -> RequestBuilder {
        let is_post = method == Method::POST;
        let mut request = self
            .http_client
            .request(method, url)
            .header(header::ORIGIN, self.origin.as_str())
            .header(header::REFERER, self.origin.as_str());

        if let Some(cookie) = cookie_header(cookies) {
            request = request.header(header::COOKIE, cookie);
        }
        if is_post {
            request = request.header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }
        request
    }

    /// Absolute `Location` values are used as-is; anything else is joined
    /// onto the remote base.
    fn resolve_location(&self, location: &str) -> Result<String> {
        self.base
            .join(location)
            .map(String::from)
            .map_err(|e| AuthError::Transport(format!("bad redirect target {}: {}", location, e)))
    }
}

/// `Cookie` header value for a jar, or `None` when it is empty.
fn cookie_header(cookies: &CookieJar) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

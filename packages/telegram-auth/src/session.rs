//! Per-identity cookie cache.
//!
//! Telegram keeps the login handshake state in its own session cookies. The
//! store remembers those cookies per phone number so a series of independent
//! HTTP calls behaves like one browser session. Entries live for the
//! configured TTL after their last write and are swept by a background reaper.
//!
//! Two concurrent calls for the same phone may interleave their cookie
//! updates; the last write wins. The remote tolerates this since the cookie
//! set converges within the TTL window.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cookie value the remote uses to clear a cookie.
pub const DELETED_COOKIE: &str = "DELETED";

/// Cookie name → value.
pub type CookieJar = BTreeMap<String, String>;

/// Cookies for one identity plus the instant they expire.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub cookies: CookieJar,
    pub expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at < now
    }
}

/// Longest TTL or reap interval a store accepts. Longer values are clamped
/// so `Instant` arithmetic cannot overflow.
pub const MAX_SESSION_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// In-memory session store, shared by every clone.
#[derive(Debug, Clone)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl: ttl.min(MAX_SESSION_WINDOW),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cookies stored for `identity`, or `None` on first contact or after expiry.
    pub fn get(&self, identity: &str) -> Option<CookieJar> {
        let now = Instant::now();
        self.lock()
            .get(identity)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.cookies.clone())
    }

    /// Overwrite the entry for `identity` and restart its TTL.
    pub fn put(&self, identity: &str, cookies: CookieJar) {
        let entry = SessionEntry {
            cookies,
            expires_at: Instant::now() + self.ttl,
        };
        self.lock().insert(identity.to_string(), entry);
    }

    /// Merge freshly received cookies into the entry for `identity`, restart
    /// its TTL, and return the merged set.
    pub fn merge<I>(&self, identity: &str, incoming: I) -> CookieJar
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        let mut cookies = entries
            .get(identity)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.cookies.clone())
            .unwrap_or_default();

        merge_cookies(&mut cookies, incoming);
        entries.insert(
            identity.to_string(),
            SessionEntry {
                cookies: cookies.clone(),
                expires_at: now + self.ttl,
            },
        );
        cookies
    }

    pub fn remove(&self, identity: &str) -> bool {
        self.lock().remove(identity).is_some()
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Number of entries that have not yet expired.
    pub fn live_len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn reap_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Run [`reap_expired`](Self::reap_expired) every `interval` until
    /// `shutdown` is cancelled.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn spawn_reaper(&self, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        let interval = interval.min(MAX_SESSION_WINDOW);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = store.reap_expired();
                        if removed > 0 {
                            debug!(removed, remaining = store.len(), "reaped expired sessions");
                        }
                    }
                }
            }

            debug!("session reaper stopped");
        })
    }
}

/// Fold `incoming` cookies into `jar`.
///
/// Same-named cookies are overwritten, cookies missing from `incoming` are
/// kept, and a cookie set to [`DELETED_COOKIE`] is removed.
pub fn merge_cookies<I>(jar: &mut CookieJar, incoming: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in incoming {
        if value == DELETED_COOKIE {
            jar.remove(&name);
        } else {
            jar.insert(name, value);
        }
    }
}

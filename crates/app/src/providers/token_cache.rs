//! Provider auth token cache.

use std::future::Future;

use jiff::{SignedDuration, Timestamp};
use tokio::sync::Mutex;

use crate::config::Secret;

#[derive(Debug)]
struct CachedToken {
    token: Secret,
    acquired_at: Timestamp,
}

/// Process-wide cache for a provider auth token.
///
/// The token is refreshed lazily once it is older than the TTL. Refreshes are
/// serialised by the cache lock, so concurrent callers share one refresh.
#[derive(Debug)]
pub struct TokenCache {
    ttl: SignedDuration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    #[must_use]
    pub fn new(ttl: SignedDuration) -> Self {
        Self {
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached token, refreshing it through `refresh` when it is missing
    /// or expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns the refresh error; the cache is left empty in that case.
    pub async fn get_or_refresh<F, Fut, E>(&self, now: Timestamp, refresh: F) -> Result<Secret, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Secret, E>>,
    {
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref()
            && now.duration_since(entry.acquired_at) < self.ttl
        {
            return Ok(entry.token.clone());
        }

        *cached = None;

        let token = refresh().await?;

        *cached = Some(CachedToken {
            token: token.clone(),
            acquired_at: now,
        });

        Ok(token)
    }

    /// Drop the cached token, forcing the next caller to refresh.
    pub async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::Credentials;
use crate::error::Result;

struct CachedCredentials {
    credentials: Credentials,
    fetched_at: DateTime<Utc>,
}

/// Lazily populated credentials for one role.
///
/// Readers share the fast path. A refresh holds the write lock for the whole
/// upstream call, so callers racing an expired entry wait for the first
/// refresh instead of issuing their own.
pub struct CredentialCache {
    refresh_margin: Duration,
    cached: RwLock<Option<CachedCredentials>>,
}

impl CredentialCache {
    pub fn new(refresh_margin: Duration) -> Self {
        Self {
            refresh_margin,
            cached: RwLock::new(None),
        }
    }

    /// Returns cached credentials if valid, otherwise stores and returns the result of `fetch`.
    ///
    /// A failed fetch leaves the cache untouched.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Credentials>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credentials>>,
    {
        {
            let cache = self.cached.read().await;
            if let Some(credentials) = self.valid(&cache) {
                return Ok(credentials);
            }
        }

        let mut cache = self.cached.write().await;

        // Another caller may have refreshed while we waited for the write lock
        if let Some(credentials) = self.valid(&cache) {
            return Ok(credentials);
        }

        let credentials = fetch().await?;
        *cache = Some(CachedCredentials {
            credentials: credentials.clone(),
            fetched_at: Utc::now(),
        });

        Ok(credentials)
    }

    fn valid(&self, cached: &Option<CachedCredentials>) -> Option<Credentials> {
        let cached = cached.as_ref()?;
        if !cached.credentials.is_fresh(Utc::now(), self.refresh_margin) {
            debug!(
                "Cached credentials fetched at {} expired at {}",
                cached.fetched_at, cached.credentials.expiration
            );
            return None;
        }

        debug!(
            "Using cached credentials fetched at {}, valid until {}",
            cached.fetched_at, cached.credentials.expiration
        );
        Some(cached.credentials.clone())
    }
}

//! Single-flight OAuth access token cache.
//!
//! The mutex is held across the refresh, so concurrent callers that find no
//! valid token wait for the one exchange in progress instead of starting
//! their own.

use std::future::Future;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use crate::domain::payment::GatewayError;

/// Tokens are treated as expired this long before the provider says so.
pub const EARLY_EXPIRY: Duration = Duration::from_secs(60);

struct CachedToken {
    value: SecretString,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Access token cache for one set of client credentials.
pub struct TokenCache {
    inner: Mutex<Option<CachedToken>>,
    early_expiry: Duration,
}

impl TokenCache {
    pub fn new(early_expiry: Duration) -> Self {
        Self {
            inner: Mutex::new(None),
            early_expiry,
        }
    }

    /// Returns the cached token, or runs `exchange` once to obtain a new one.
    ///
    /// `exchange` yields the token and its lifetime as reported by the provider.
    pub async fn get_or_refresh<F, Fut>(&self, exchange: F) -> Result<SecretString, GatewayError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(SecretString, Duration), GatewayError>>,
    {
        let mut cached = self.inner.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.value.clone());
        }

        let (value, lifetime) = exchange().await?;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(self.early_expiry),
        });
        Ok(value)
    }

    /// Drops the cached token if it is still the one that was rejected.
    pub async fn invalidate(&self, rejected: &SecretString) {
        let mut cached = self.inner.lock().await;
        let is_rejected = cached
            .as_ref()
            .is_some_and(|t| t.value.expose_secret() == rejected.expose_secret());
        if is_rejected {
            *cached = None;
        }
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(EARLY_EXPIRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn token(value: &str, lifetime_secs: u64) -> Result<(SecretString, Duration), GatewayError> {
        Ok((
            SecretString::new(value.to_string()),
            Duration::from_secs(lifetime_secs),
        ))
    }

    #[tokio::test]
    async fn valid_token_is_reused() {
        let cache = TokenCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    token("A", 3600)
                })
                .await
                .unwrap();
            assert_eq!(value.expose_secret(), "A");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_inside_early_expiry_margin_is_refreshed() {
        let cache = TokenCache::default();
        cache.get_or_refresh(|| async { token("short", 30) }).await.unwrap();

        let value = cache.get_or_refresh(|| async { token("fresh", 3600) }).await.unwrap();
        assert_eq!(value.expose_secret(), "fresh");
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_exchange() {
        let cache = Arc::new(TokenCache::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_refresh(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            token("shared", 3600)
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().expose_secret(), "shared");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_exchange_leaves_cache_empty() {
        let cache = TokenCache::default();
        let err = cache
            .get_or_refresh(|| async { Err(GatewayError::validation("nope")) })
            .await;
        assert!(err.is_err());

        let value = cache.get_or_refresh(|| async { token("B", 3600) }).await.unwrap();
        assert_eq!(value.expose_secret(), "B");
    }

    #[tokio::test]
    async fn invalidate_only_drops_the_rejected_token() {
        let cache = TokenCache::default();
        let first = cache.get_or_refresh(|| async { token("A", 3600) }).await.unwrap();

        cache.invalidate(&SecretString::new("other".to_string())).await;
        let again = cache.get_or_refresh(|| async { token("B", 3600) }).await.unwrap();
        assert_eq!(again.expose_secret(), "A");

        cache.invalidate(&first).await;
        let replaced = cache.get_or_refresh(|| async { token("B", 3600) }).await.unwrap();
        assert_eq!(replaced.expose_secret(), "B");
    }
}

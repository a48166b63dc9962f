//! Provider public keys keyed by certificate serial.
//!
//! Refreshes are single-flight: the refresh mutex is held across the fetch,
//! and callers re-check the cache once they hold it.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use rsa::RsaPublicKey;
use tokio::sync::{Mutex, RwLock};

use crate::domain::payment::GatewayError;

/// Minimum spacing between refreshes triggered by an unknown serial.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyLookup {
    Hit(RsaPublicKey),
    /// Not cached; `refresh` says whether fetching again is allowed.
    Miss { refresh: bool },
}

/// Cached certificate set with expiry tracking.
struct CachedCertificates {
    keys: HashMap<String, RsaPublicKey>,
    fetched_at: Instant,
}

/// Certificate cache shared by all webhook verifications.
pub struct CertificateCache {
    inner: RwLock<Option<CachedCertificates>>,
    refresh: Mutex<()>,
    ttl: Duration,
}

impl CertificateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(None),
            refresh: Mutex::new(()),
            ttl,
        }
    }

    /// Key for `serial`, running `fetch` at most once across concurrent callers.
    pub async fn get_or_refresh<F, Fut>(&self, serial: &str, fetch: F) -> Result<RsaPublicKey, GatewayError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HashMap<String, RsaPublicKey>, GatewayError>>,
    {
        match self.lookup(serial).await {
            KeyLookup::Hit(key) => return Ok(key),
            KeyLookup::Miss { refresh: false } => return Err(unknown_serial(serial)),
            KeyLookup::Miss { refresh: true } => {}
        }

        let _refreshing = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        match self.lookup(serial).await {
            KeyLookup::Hit(key) => return Ok(key),
            KeyLookup::Miss { refresh: false } => return Err(unknown_serial(serial)),
            KeyLookup::Miss { refresh: true } => {}
        }

        let keys = fetch().await?;
        let key = keys.get(serial).cloned();
        self.replace(keys).await;
        key.ok_or_else(|| unknown_serial(serial))
    }

    pub async fn lookup(&self, serial: &str) -> KeyLookup {
        let cache = self.inner.read().await;
        match cache.as_ref() {
            None => KeyLookup::Miss { refresh: true },
            Some(cached) if cached.fetched_at.elapsed() > self.ttl => KeyLookup::Miss { refresh: true },
            Some(cached) => match cached.keys.get(serial) {
                Some(key) => KeyLookup::Hit(key.clone()),
                // Rotation: an unseen serial may be a new certificate.
                None => KeyLookup::Miss {
                    refresh: cached.fetched_at.elapsed() >= MIN_REFRESH_INTERVAL,
                },
            },
        }
    }

    pub async fn replace(&self, keys: HashMap<String, RsaPublicKey>) {
        let mut cache = self.inner.write().await;
        *cache = Some(CachedCertificates {
            keys,
            fetched_at: Instant::now(),
        });
    }
}

fn unknown_serial(serial: &str) -> GatewayError {
    GatewayError::signature(format!("unknown certificate serial {}", serial))
}

impl Default for CertificateCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

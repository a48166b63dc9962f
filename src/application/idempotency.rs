//! Single-flight idempotency table.
//!
//! The first caller for a key spawns the upstream call as its own task and
//! publishes a [`Shared`] handle to its result. Later callers with the same
//! key await that handle instead of calling the provider again.
//!
//! Successful results stay in the table for the retention window, so replays
//! get the same [`OrderResult`]. Failed results are removed as soon as the
//! task finishes, so the caller may retry with the same key.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::domain::payment::{GatewayError, OrderResult, ProviderKind};

/// Handle to the one upstream call made for a key.
pub type SharedOrder = Shared<BoxFuture<'static, Result<OrderResult, GatewayError>>>;

struct Entry {
    id: u64,
    order: SharedOrder,
    started_at: Instant,
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// Whether a call started new upstream work or joined existing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Started,
    Joined,
}

/// In-process idempotency table keyed by provider and idempotency key.
pub struct IdempotencyTable {
    entries: Entries,
    next_id: AtomicU64,
    ttl: Duration,
}

impl IdempotencyTable {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            ttl,
        }
    }

    /// Returns the live handle for `key`, or spawns `upstream` and records it.
    ///
    /// `upstream` is dropped unpolled when the key already has a live entry.
    /// Must be called from within a Tokio runtime.
    pub fn run<F>(&self, provider: ProviderKind, key: &str, upstream: F) -> (SharedOrder, Flight)
    where
        F: Future<Output = Result<OrderResult, GatewayError>> + Send + 'static,
    {
        let table_key = format!("{}:{}", provider, key);
        let mut entries = lock(&self.entries);
        let now = Instant::now();

        if let Some(entry) = entries.get(&table_key) {
            if now.duration_since(entry.started_at) < self.ttl {
                return (entry.order.clone(), Flight::Joined);
            }
        }

        let ttl = self.ttl;
        entries.retain(|_, entry| now.duration_since(entry.started_at) < ttl);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task_entries = Arc::clone(&self.entries);
        let task_key = table_key.clone();

        let task = tokio::spawn(async move {
            let result = upstream.await;
            if result.is_err() {
                remove_entry(&task_entries, &task_key, id);
            }
            result
        });

        let join_entries = Arc::clone(&self.entries);
        let join_key = table_key.clone();
        let order = async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) => {
                    remove_entry(&join_entries, &join_key, id);
                    Err(GatewayError::network(
                        provider,
                        format!("order task failed: {}", join_error),
                    ))
                }
            }
        }
        .boxed()
        .shared();

        entries.insert(
            table_key,
            Entry {
                id,
                order: order.clone(),
                started_at: now,
            },
        );

        (order, Flight::Started)
    }

    /// Number of keys currently held, including expired ones not yet pruned.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, Entry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes `key` only if it still belongs to the flight `id`.
fn remove_entry(entries: &Entries, key: &str, id: u64) {
    let mut entries = lock(entries);
    if entries.get(key).is_some_and(|entry| entry.id == id) {
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn created(id: &str) -> OrderResult {
        OrderResult::created(ProviderKind::Card, id, None, serde_json::Value::Null)
    }

    fn counted(
        calls: &Arc<AtomicUsize>,
        result: Result<OrderResult, GatewayError>,
    ) -> impl Future<Output = Result<OrderResult, GatewayError>> + Send + 'static {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            result
        }
    }

    #[tokio::test]
    async fn same_key_joins_the_first_flight() {
        let table = IdempotencyTable::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let (first, flight) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("cs_1"))));
        assert_eq!(flight, Flight::Started);
        let (second, flight) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("cs_2"))));
        assert_eq!(flight, Flight::Joined);

        assert_eq!(first.await.unwrap().provider_order_id, "cs_1");
        assert_eq!(second.await.unwrap().provider_order_id, "cs_1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completed_success_is_replayed() {
        let table = IdempotencyTable::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let (first, _) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("cs_1"))));
        first.await.unwrap();

        let (replay, flight) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("cs_2"))));
        assert_eq!(flight, Flight::Joined);
        assert_eq!(replay.await.unwrap().provider_order_id, "cs_1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_frees_the_key() {
        let table = IdempotencyTable::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = GatewayError::upstream_status(ProviderKind::Card, 502, "bad gateway");

        let (first, _) = table.run(ProviderKind::Card, "k1", counted(&calls, Err(failure)));
        assert!(first.await.is_err());
        // The spawned task removes the entry before its result is observable.
        assert!(table.is_empty());

        let (retry, flight) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("cs_2"))));
        assert_eq!(flight, Flight::Started);
        assert_eq!(retry.await.unwrap().provider_order_id, "cs_2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn keys_are_scoped_per_provider() {
        let table = IdempotencyTable::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let (_, a) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("a"))));
        let (_, b) = table.run(ProviderKind::Wallet, "k1", counted(&calls, Ok(created("b"))));

        assert_eq!(a, Flight::Started);
        assert_eq!(b, Flight::Started);
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn expired_entries_start_new_flights_and_are_pruned() {
        let table = IdempotencyTable::new(Duration::from_millis(10));
        let calls = Arc::new(AtomicUsize::new(0));

        let (first, _) = table.run(ProviderKind::Card, "old", counted(&calls, Ok(created("cs_1"))));
        first.await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let (_, flight) = table.run(ProviderKind::Card, "new", counted(&calls, Ok(created("cs_2"))));
        assert_eq!(flight, Flight::Started);
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn dropped_waiter_does_not_cancel_upstream() {
        let table = IdempotencyTable::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let (order, _) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("cs_1"))));
        let waited = tokio::time::timeout(Duration::from_millis(1), order).await;
        assert!(waited.is_err());

        let (again, flight) = table.run(ProviderKind::Card, "k1", counted(&calls, Ok(created("cs_9"))));
        assert_eq!(flight, Flight::Joined);
        assert_eq!(again.await.unwrap().provider_order_id, "cs_1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

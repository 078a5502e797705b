//! Per-key in-process single-flight locks
//!
//! Concurrent callers that miss the same cache key serialize on one lock, so only the
//! first rebuilds while the rest re-read the warmed cache.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock table keyed by cache key
#[derive(Default)]
pub struct SingleFlight {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held while rebuilding one key; the table entry is removed when the last holder leaves
pub struct FlightGuard<'a> {
    table: &'a SingleFlight,
    key: String,
    lock: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: &str) -> FlightGuard<'_> {
        // entries only the table still holds were left by waiters cancelled after the
        // last holder released
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        let lock = Arc::clone(self.locks.entry(key.to_string()).or_default().value());
        let guard = Arc::clone(&lock).lock_owned().await;
        FlightGuard {
            table: self,
            key: key.to_string(),
            lock,
            guard: Some(guard),
        }
    }

    /// Keys with a live lock entry
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // table entry + this handle; anyone else still waiting keeps the entry alive
        self.table.locks.remove_if(&self.key, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

impl std::fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_serializes_same_key() {
        let flight = Arc::new(SingleFlight::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flight = Arc::clone(&flight);
            let active = Arc::clone(&active);
            let max_active = Arc::clone(&max_active);
            handles.push(tokio::spawn(async move {
                let _guard = flight.acquire("counts:thread:1").await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_entry_is_swept() {
        let flight = Arc::new(SingleFlight::new());
        let holder = flight.acquire("counts:post:1").await;

        let waiter = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                let _guard = flight.acquire("counts:post:1").await;
            })
        };
        tokio::task::yield_now().await;

        // the waiter still holds the lock handle, so the entry survives the release
        drop(holder);
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());
        assert_eq!(flight.in_flight(), 1);

        let other = flight.acquire("counts:post:2").await;
        assert_eq!(flight.in_flight(), 1);
        drop(other);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let flight = SingleFlight::new();
        let _a = flight.acquire("a").await;
        let _b = flight.acquire("b").await;
        assert_eq!(flight.in_flight(), 2);
    }
}

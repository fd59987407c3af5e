//! In-memory counter store.
//!
//! A deterministic, thread-safe [`CounterStore`] for tests and for
//! single-process deployments that want debounce semantics without an
//! external store. Expiry is lazy: entries are judged against the clock
//! when touched, not swept in the background.

use std::collections::BTreeMap;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CounterStoreError;
use crate::store::CounterStore;

/// Counter value with its expiry deadline.
#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    value: i64,
    expires_at: Instant,
}

/// Deterministic in-process counter store.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: RwLock<BTreeMap<String, CounterEntry>>,
}

impl MemoryCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current live value under `key`, `None` if absent or expired.
    ///
    /// Inspection only; does not touch expiry.
    pub async fn current(&self, key: &str) -> Option<i64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value)
    }
}

// Instant math panics on overflow; clamp absurd TTLs to a distant deadline.
fn deadline_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + Duration::from_secs(86_400 * 365))
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> Result<i64, CounterStoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let value = match entries.get(key) {
            Some(entry) if entry.expires_at > now => entry.value.saturating_add(1),
            _ => 1,
        };
        entries.insert(key.to_string(), CounterEntry {
            value,
            expires_at: deadline_after(now, ttl),
        });
        Ok(value)
    }

    async fn exchange_to_zero(&self, key: &str) -> Result<Option<i64>, CounterStoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        match entries.get(key).copied() {
            Some(entry) if entry.expires_at > now => {
                // Keep the deadline: a zeroed counter still expires on schedule
                entries.insert(key.to_string(), CounterEntry {
                    value: 0,
                    expires_at: entry.expires_at,
                });
                Ok(Some(entry.value))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

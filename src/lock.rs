//! Counter-based lock over a shared counter store.
//!
//! Acquisition is a single atomic increment: whoever observes a
//! post-increment count of 1 holds the lock, every later caller just grows
//! the counter. Release exchanges the counter to zero and reads the previous
//! value, so the holder learns whether anyone knocked while it was busy.
//! The counter's TTL is the only liveness safeguard: a crashed holder's key
//! simply expires.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::CounterStoreError;
use crate::key::lock_key;
use crate::store::CounterStore;

/// Default lifetime for lock counters.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(30);

/// Decide whether a post-increment count grants the lock.
///
/// Total over any integer a store may hand back; zero and negative values
/// grant, anything past 1 means someone else got there first.
#[inline]
fn grants_lock(count: i64) -> bool {
    count <= 1
}

/// Decide whether a pre-exchange count means someone else tried to acquire
/// while the lock was held. An absent key reads as no contention.
#[inline]
fn had_contention(previous: Option<i64>) -> bool {
    previous.unwrap_or(0) > 1
}

/// Counter-based lock.
///
/// Holds no per-key state; one `Lock` serves any number of keys against its
/// store. Keys are namespaced with [`crate::key::LOCK_KEY_PREFIX`] before
/// they reach the store.
pub struct Lock<S: CounterStore + ?Sized> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S: CounterStore + ?Sized> Lock<S> {
    /// Create a lock with the default TTL.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_ttl(store, DEFAULT_LOCK_TTL)
    }

    /// Create a lock whose counters expire after `ttl`.
    pub fn with_ttl(store: Arc<S>, ttl: Duration) -> Self {
        assert!(!ttl.is_zero(), "LOCK: ttl must be positive");
        Self { store, ttl }
    }

    /// Try to acquire the lock for `key` and return `true` on success.
    ///
    /// Returns `false` if the lock is already held by someone else. Never
    /// blocks or retries; a denied attempt leaves its mark on the counter
    /// for the holder to discover at release time.
    pub async fn acquire(&self, key: &str) -> Result<bool, CounterStoreError> {
        let key = lock_key(key);
        let count = self.store.increment_with_ttl(&key, self.ttl).await?;
        let acquired = grants_lock(count);
        debug!(key = %key, count, acquired, "lock acquire");
        Ok(acquired)
    }

    /// Release the lock for `key`.
    ///
    /// Returns `true` if somebody else tried to acquire the same lock during
    /// the time it was held, otherwise `false`. Releasing an unknown key is
    /// a no-op that reports no contention.
    pub async fn release(&self, key: &str) -> Result<bool, CounterStoreError> {
        let key = lock_key(key);
        let previous = self.store.exchange_to_zero(&key).await?;
        let contended = had_contention(previous);
        debug!(key = %key, previous = previous.unwrap_or(0), contended, "lock release");
        Ok(contended)
    }

    /// Counter lifetime used by this lock.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

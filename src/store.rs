//! Counter store trait.
//!
//! Everything in this crate coordinates through two primitive operations on a
//! shared integer counter. Any store that can perform both atomically (Redis,
//! a SQL row with the right isolation, the in-memory store in
//! [`crate::MemoryCounterStore`]) can back the lock and the policies built on
//! top of it.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CounterStoreError;

/// Shared integer counters with per-key expiry.
///
/// Implementations must provide linearizable counters: concurrent
/// `increment_with_ttl` calls on one key each observe a distinct
/// post-increment value, and `exchange_to_zero` observes the value left by
/// the last completed write.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter under `key` by one and (re)set its expiry to
    /// `ttl`, with no other operation on the key interleaved between the two
    /// steps. A missing or expired key starts at zero, so the first
    /// increment observes 1.
    ///
    /// Returns the post-increment value.
    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> Result<i64, CounterStoreError>;

    /// Atomically set the counter under `key` to zero and return the value it
    /// held immediately before, or `None` if the key was absent or expired.
    ///
    /// The key's remaining expiry is left in place; a zeroed counter still
    /// vanishes on its original schedule.
    async fn exchange_to_zero(&self, key: &str) -> Result<Option<i64>, CounterStoreError>;
}

// Blanket implementation for Arc<T>
#[async_trait]
impl<T: CounterStore + ?Sized> CounterStore for std::sync::Arc<T> {
    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> Result<i64, CounterStoreError> {
        (**self).increment_with_ttl(key, ttl).await
    }

    async fn exchange_to_zero(&self, key: &str) -> Result<Option<i64>, CounterStoreError> {
        (**self).exchange_to_zero(key).await
    }
}

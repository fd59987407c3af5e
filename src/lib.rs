//! Counter-based call coalescing over a shared counter store.
//!
//! Multiple independent processes agree, without a coordinator, on which one
//! of several near-simultaneous attempts at a named unit of work actually
//! runs, and whether anyone else asked for that unit of work while it was
//! running. The whole protocol is two atomic store operations: increment a
//! namespaced counter with an expiry to acquire, exchange it to zero to
//! release. A post-increment count of 1 grants; a pre-exchange count above 1
//! means someone knocked during the run.
//!
//! Two policies are built on the [`Lock`] primitive:
//!
//! - [`Debounced`] - concurrent calls sharing a key collapse into one running
//!   execution; duplicates return immediately with no result. The finishing
//!   caller learns whether it was contended, can notify a callback, and can
//!   re-run itself once per contention signal with its original arguments.
//! - [`SkipDuplicates`] - acquire-only throttle: the first call per key per
//!   TTL window runs, every duplicate in the window is dropped. The counter
//!   is never reset; the window ends when it expires.
//!
//! Any backend with atomic increment+expire and exchange-to-zero can
//! implement [`CounterStore`]: the crate ships [`MemoryCounterStore`] for
//! tests and single-process use, and `RedisCounterStore` behind the `redis`
//! feature for production.
//!
//! ## Debounce Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use holdoff::{Debounced, DebounceConfig, MemoryCounterStore};
//!
//! let store = Arc::new(MemoryCounterStore::new());
//! let refresh = Debounced::with_config(
//!     store,
//!     "refresh",
//!     |tenant: String| async move { rebuild_view(&tenant).await },
//!     DebounceConfig { repeat: true, ..Default::default() },
//! );
//!
//! // Concurrent duplicates for the same tenant return Ok(None); the one
//! // caller that ran re-runs once more if anyone knocked meanwhile.
//! let outcome = refresh.call("acme".to_string()).await?;
//! ```
//!
//! ## Skip-Duplicates Example
//!
//! ```ignore
//! use holdoff::SkipDuplicates;
//!
//! let notify = SkipDuplicates::new(store, "notify", |user: String| async move {
//!     send_digest(&user).await
//! });
//!
//! notify.call("alice".to_string()).await?; // runs
//! notify.call("alice".to_string()).await?; // Ok(None) until the TTL lapses
//! ```

pub mod debounce;
pub mod error;
pub mod key;
pub mod lock;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod skip;
pub mod store;

pub use debounce::ContentionCallback;
pub use debounce::DebounceConfig;
pub use debounce::Debounced;
pub use debounce::StoreSource;
pub use error::CounterStoreError;
pub use key::KeySource;
pub use key::LOCK_KEY_PREFIX;
pub use key::call_key;
pub use key::lock_key;
pub use lock::DEFAULT_LOCK_TTL;
pub use lock::Lock;
pub use memory::MemoryCounterStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisCounterStore;
pub use skip::SkipDuplicates;
pub use store::CounterStore;

//! Duplicate-skipping policy for async callables.
//!
//! The cheaper sibling of [`crate::Debounced`]: acquire-only. The first call
//! in a TTL window runs, every duplicate inside the window is dropped. The
//! counter is never exchanged back to zero, it rides out its own expiry, so
//! nobody learns about the duplicates and nothing repeats.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::debounce::StoreSource;
use crate::key::KeySource;
use crate::key::call_key;
use crate::lock::DEFAULT_LOCK_TTL;
use crate::lock::Lock;
use crate::store::CounterStore;

type KeyFn<A> = Box<dyn Fn(&A) -> String + Send + Sync>;

/// A callable wrapped with the duplicate-skipping policy.
///
/// At most one execution per key per TTL window.
pub struct SkipDuplicates<S: CounterStore + ?Sized + 'static, A: 'static, F> {
    source: StoreSource<S, A>,
    name: String,
    ttl: Duration,
    key_fn: KeyFn<A>,
    custom_key: bool,
    func: F,
}

impl<S, A, F> SkipDuplicates<S, A, F>
where
    S: CounterStore + ?Sized + 'static,
    A: 'static,
{
    /// Wrap `func` with the default window ([`DEFAULT_LOCK_TTL`]).
    pub fn new(source: impl Into<StoreSource<S, A>>, name: impl Into<String>, func: F) -> Self
    where
        A: KeySource,
    {
        Self::with_ttl(source, name, func, DEFAULT_LOCK_TTL)
    }

    /// Wrap `func` with an explicit window length.
    pub fn with_ttl(
        source: impl Into<StoreSource<S, A>>,
        name: impl Into<String>,
        func: F,
        ttl: Duration,
    ) -> Self
    where
        A: KeySource,
    {
        let name = name.into();
        assert!(!name.is_empty(), "SKIP: name must not be empty");
        assert!(!ttl.is_zero(), "SKIP: ttl must be positive");

        let default_key = {
            let name = name.clone();
            Box::new(move |args: &A| call_key(&name, args))
        };

        Self {
            source: source.into(),
            name,
            ttl,
            key_fn: default_key,
            custom_key: false,
            func,
        }
    }

    /// Replace the default key strategy.
    pub fn with_key<K>(mut self, key: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.key_fn = Box::new(key);
        self.custom_key = true;
        self
    }

    /// Name used by the default key strategy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the suppression window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the default key strategy was replaced.
    pub fn has_custom_key(&self) -> bool {
        self.custom_key
    }

    /// Invoke the wrapped callable unless a duplicate already ran.
    ///
    /// Returns `Ok(None)` when the key's window is already open: the call is
    /// dropped without blocking and without running the callable. The window
    /// is never closed early, not even when the callable fails; it ends only
    /// when the counter expires.
    pub async fn call<Fut, R>(&self, args: A) -> Result<Option<R>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let store = self.source.get(&args);
        let lock = Lock::with_ttl(store, self.ttl);
        let key = (self.key_fn)(&args);

        if !lock.acquire(&key).await? {
            debug!(name = %self.name, key = %key, "duplicate call skipped");
            return Ok(None);
        }

        let result = (self.func)(args).await?;
        Ok(Some(result))
    }
}

//! Debounce policy for async callables.
//!
//! A debounced callable runs under a counter lock keyed by its arguments.
//! While one caller is busy, every duplicate call is skipped outright, but
//! each one leaves its mark on the counter. When the busy caller finishes it
//! learns whether anyone knocked, can notify a callback, and can re-run
//! itself once per contention signal so the freshest demand is not lost.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use tracing::debug;

use crate::key::KeySource;
use crate::key::call_key;
use crate::lock::DEFAULT_LOCK_TTL;
use crate::lock::Lock;
use crate::store::CounterStore;

/// Boxed async callback run with the original arguments when a finished call
/// learns it was contended.
pub type ContentionCallback<A> = Box<dyn Fn(A) -> BoxFuture<'static, Result<()>> + Send + Sync>;

type KeyFn<A> = Box<dyn Fn(&A) -> String + Send + Sync>;

/// Configuration for a debounced callable.
#[derive(Debug, Clone)]
pub struct DebounceConfig {
    /// Lock counter lifetime; the only safeguard against a crashed holder.
    pub ttl: Duration,
    /// Re-run the callable once per observed contention signal.
    pub repeat: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_LOCK_TTL,
            repeat: false,
        }
    }
}

/// Where a call finds its counter store.
pub enum StoreSource<S: ?Sized + 'static, A: 'static> {
    /// One store shared by every call.
    Fixed(Arc<S>),
    /// Resolve the store from the call arguments, once per call.
    Resolver(Box<dyn Fn(&A) -> Arc<S> + Send + Sync>),
}

impl<S: ?Sized + 'static, A: 'static> StoreSource<S, A> {
    /// Resolve the store from the call arguments, for callables whose
    /// backing store travels with the data they operate on.
    pub fn resolver<G>(resolve: G) -> Self
    where
        G: Fn(&A) -> Arc<S> + Send + Sync + 'static,
    {
        Self::Resolver(Box::new(resolve))
    }

    pub(crate) fn get(&self, args: &A) -> Arc<S> {
        match self {
            Self::Fixed(store) => Arc::clone(store),
            Self::Resolver(resolve) => resolve(args),
        }
    }
}

impl<S: ?Sized + 'static, A: 'static> From<Arc<S>> for StoreSource<S, A> {
    fn from(store: Arc<S>) -> Self {
        Self::Fixed(store)
    }
}

/// A callable wrapped with the debounce policy.
///
/// Construction freezes the callable's name, TTL, repeat flag, key strategy
/// and callback; [`Debounced::call`] applies them to every invocation.
pub struct Debounced<S: CounterStore + ?Sized + 'static, A: 'static, F> {
    source: StoreSource<S, A>,
    name: String,
    config: DebounceConfig,
    key_fn: KeyFn<A>,
    custom_key: bool,
    callback: Option<ContentionCallback<A>>,
    func: F,
}

impl<S, A, F> Debounced<S, A, F>
where
    S: CounterStore + ?Sized + 'static,
    A: 'static,
{
    /// Wrap `func` with the default configuration.
    ///
    /// `name` seeds the default lock key, `"<name>(<first positional
    /// argument>)"`; pass the callable's name as it reads at the call site.
    pub fn new(source: impl Into<StoreSource<S, A>>, name: impl Into<String>, func: F) -> Self
    where
        A: KeySource,
    {
        Self::with_config(source, name, func, DebounceConfig::default())
    }

    /// Wrap `func` with an explicit configuration.
    pub fn with_config(
        source: impl Into<StoreSource<S, A>>,
        name: impl Into<String>,
        func: F,
        config: DebounceConfig,
    ) -> Self
    where
        A: KeySource,
    {
        let name = name.into();
        assert!(!name.is_empty(), "DEBOUNCE: name must not be empty");
        assert!(!config.ttl.is_zero(), "DEBOUNCE: ttl must be positive");

        let default_key = {
            let name = name.clone();
            Box::new(move |args: &A| call_key(&name, args))
        };

        Self {
            source: source.into(),
            name,
            config,
            key_fn: default_key,
            custom_key: false,
            callback: None,
            func,
        }
    }

    /// Replace the default key strategy.
    ///
    /// The function receives the call arguments and returns the raw key;
    /// the `lock:` namespace is applied afterwards. It runs once per
    /// top-level [`Debounced::call`], not per repeat: a repeat re-runs the
    /// callable with the same arguments, so it reuses the key they produced
    /// the first time.
    pub fn with_key<K>(mut self, key: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.key_fn = Box::new(key);
        self.custom_key = true;
        self
    }

    /// Install a contention callback.
    ///
    /// Runs after a contended release, with a clone of the original
    /// arguments, before any repeat. An error from the callback replaces
    /// the call's result.
    pub fn with_callback<C, Fut>(mut self, callback: C) -> Self
    where
        C: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.callback = Some(Box::new(move |args| Box::pin(callback(args))));
        self
    }

    /// Name used by the default key strategy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock counter lifetime.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Whether a contended call re-runs itself.
    pub fn repeat(&self) -> bool {
        self.config.repeat
    }

    /// Whether a contention callback is installed.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Whether the default key strategy was replaced.
    pub fn has_custom_key(&self) -> bool {
        self.custom_key
    }

    /// Invoke the wrapped callable under the debounce policy.
    ///
    /// Returns `Ok(None)` when the key's lock is already held: the call is
    /// dropped without blocking and without running the callable. Otherwise
    /// the callable runs and the lock is released afterwards, even when the
    /// callable failed.
    ///
    /// A contended release (someone knocked during the run) triggers the
    /// callback, then, with `repeat` enabled, re-enters the whole policy
    /// with a clone of the *original* arguments; intervening callers'
    /// arguments are gone with their skipped calls. Each re-entry consumes
    /// one contention signal, so the chain ends as soon as a run closes
    /// quietly, or hands `Ok(None)` back if the fresh lock was taken first.
    ///
    /// Error precedence follows the store, then the callable, then the
    /// callback: a release error outranks the callable's own failure, and a
    /// failed callable propagates before the callback or any repeat is
    /// considered.
    pub async fn call<Fut, R>(&self, args: A) -> Result<Option<R>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<R>>,
        A: Clone,
    {
        let store = self.source.get(&args);
        let lock = Lock::with_ttl(store, self.config.ttl);
        let key = (self.key_fn)(&args);

        loop {
            if !lock.acquire(&key).await? {
                debug!(name = %self.name, key = %key, "debounced call skipped");
                return Ok(None);
            }

            let outcome = (self.func)(args.clone()).await;

            // Give the lock back even when the callable failed
            let contended = lock.release(&key).await?;

            let result = outcome?;

            if !contended {
                return Ok(Some(result));
            }

            if let Some(callback) = &self.callback {
                debug!(name = %self.name, key = %key, "running contention callback");
                callback(args.clone()).await?;
            }

            if !self.config.repeat {
                return Ok(Some(result));
            }

            debug!(name = %self.name, key = %key, "contended, repeating call");
        }
    }
}

//! Error types for counter store operations.

use snafu::Snafu;

/// Errors from a counter store backend.
///
/// Policies never retry or mask these; they surface at the call site
/// that touched the store.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum CounterStoreError {
    /// Store cannot be reached (connection refused, dropped, timed out).
    #[snafu(display("counter store unavailable: {reason}"))]
    Unavailable {
        /// Description of the connectivity failure.
        reason: String,
    },

    /// Store rejected the operation.
    #[snafu(display("counter operation failed: {reason}"))]
    Failed {
        /// Description of the rejection.
        reason: String,
    },

    /// Value under the key exists but is not an integer counter.
    #[snafu(display("value at key '{key}' is not a counter"))]
    NotACounter {
        /// The offending key.
        key: String,
    },
}

//! Redis-backed counter store.
//!
//! `INCR` and `PEXPIRE` ride one MULTI/EXEC pipeline so no other client's
//! command lands between the increment and the expiry refresh;
//! `SET key 0 KEEPTTL GET` is the exchange. Connection management stays with
//! the caller: the store
//! adopts a ready [`ConnectionManager`] handle and clones it per operation
//! (the manager multiplexes and reconnects underneath).

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::error::CounterStoreError;
use crate::store::CounterStore;

/// [`CounterStore`] over a shared Redis instance.
pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl RedisCounterStore {
    /// Wrap an established connection manager.
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

// KEEPTTL (Redis >= 6.2) because a plain SET discards the key's expiry;
// the zeroed counter must still vanish on its original schedule. GET makes
// the write return the previous value, nil if the key was absent.
fn exchange_command(key: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(0).arg("KEEPTTL").arg("GET");
    cmd
}

fn map_error(key: &str, err: redis::RedisError) -> CounterStoreError {
    if err.is_io_error() || err.is_timeout() || err.is_connection_refusal() {
        CounterStoreError::Unavailable {
            reason: err.to_string(),
        }
    } else if err.kind() == redis::ErrorKind::TypeError {
        CounterStoreError::NotACounter {
            key: key.to_string(),
        }
    } else {
        CounterStoreError::Failed {
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> Result<i64, CounterStoreError> {
        let mut conn = self.connection.clone();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(key)
            .cmd("PEXPIRE")
            .arg(key)
            .arg(ttl_ms)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|err| map_error(key, err))?;

        Ok(count)
    }

    async fn exchange_to_zero(&self, key: &str) -> Result<Option<i64>, CounterStoreError> {
        let mut conn = self.connection.clone();

        let previous: Option<i64> = exchange_command(key)
            .query_async(&mut conn)
            .await
            .map_err(|err| map_error(key, err))?;

        Ok(previous)
    }
}

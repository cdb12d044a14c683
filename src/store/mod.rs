use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

mod memory;
mod redis_store;
#[cfg(test)]
pub(crate) mod testing;

pub use memory::InMemoryStore;
pub use redis_store::RedisStore;

/// The atomic primitives a lock needs from its backing store.
///
/// Every method must be a single atomic step on the store side. A `false`
/// result is the store's ordinary "no" (key present, value mismatch, key
/// absent); `Err` is reserved for the store failing to answer.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set `key` to `value` with a TTL, only if `key` does not exist.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    /// Delete `key` only if its current value equals `expected`.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError>;

    /// Reset the TTL of `key`, whatever it holds. `false` if the key is absent.
    async fn refresh_expiry(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Reset the TTL of `key` only if its current value equals `expected`.
    async fn refresh_expiry_if_equals(
        &self,
        key: &str,
        expected: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;
}

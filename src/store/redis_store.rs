use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client, Script};

use crate::{config::StoreConfig, error::StoreError};

use super::KeyValueStore;

static DELETE_IF_EQUALS_SCRIPT: &str = r"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
";

static EXPIRE_IF_EQUALS_SCRIPT: &str = r"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('expire', KEYS[1], ARGV[2])
else
    return 0
end
";

/// Redis-backed store.
///
/// Clones share one multiplexed connection that reconnects on its own.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    delete_script: Script,
    expire_script: Script,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            delete_script: Script::new(DELETE_IF_EQUALS_SCRIPT),
            expire_script: Script::new(EXPIRE_IF_EQUALS_SCRIPT),
        }
    }

    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }
}

// EX/EXPIRE take whole seconds; anything shorter would be an immediate expiry.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        // SET .. NX replies OK when written and nil when the key already exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = self
            .delete_script
            .key(key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await?;
        Ok(deleted == 1)
    }

    async fn refresh_expiry(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let refreshed: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(ttl_seconds(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(refreshed == 1)
    }

    async fn refresh_expiry_if_equals(
        &self,
        key: &str,
        expected: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let refreshed: i64 = self
            .expire_script
            .key(key)
            .arg(expected)
            .arg(ttl_seconds(ttl))
            .invoke_async(&mut conn)
            .await?;
        Ok(refreshed == 1)
    }
}

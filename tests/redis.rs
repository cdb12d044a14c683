//! Runs against a live Redis. Start one and run with `cargo test -- --ignored`;
//! `REDIS_URL` overrides the default address.

use std::{sync::Arc, time::Duration};

use rdlock::{Context, DistributedLock, RedisStore, RenewableLock, StoreConfig};
use tokio::time::sleep;

const LEASE_SECONDS: u64 = 10;
const LEASE: Duration = Duration::from_secs(LEASE_SECONDS);
// redis expiry is not instant to the millisecond
const SLACK: Duration = Duration::from_millis(500);

async fn store() -> Arc<RedisStore> {
    let config = match std::env::var("REDIS_URL") {
        Ok(url) => StoreConfig { url },
        Err(_) => StoreConfig::default(),
    };
    Arc::new(RedisStore::connect(&config).await.unwrap())
}

#[tokio::test]
#[ignore]
async fn basic_lock_lifecycle() {
    let store = store().await;
    let ctx = Context::new();
    let key = "rdlock:test:basic";
    let mut lock = DistributedLock::new(store.clone(), key, LEASE_SECONDS).unwrap();

    assert!(!lock.unlock(&ctx).await.unwrap());
    assert!(lock.lock(&ctx).await.unwrap());

    let mut other = DistributedLock::new(store.clone(), key, LEASE_SECONDS).unwrap();
    assert!(!other.lock(&ctx).await.unwrap());

    sleep(LEASE + SLACK).await;
    let mut third = DistributedLock::new(store.clone(), key, LEASE_SECONDS).unwrap();
    assert!(third.lock(&ctx).await.unwrap());
    assert!(!lock.unlock(&ctx).await.unwrap());

    assert!(third.unlock(&ctx).await.unwrap());
    assert!(!third.unlock(&ctx).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn renewable_lock_survives_its_lease_until_cancelled() {
    let store = store().await;
    let key = "rdlock:test:renewable";
    let ctx = Context::new();
    let mut lock = RenewableLock::new(store.clone(), key, LEASE_SECONDS).unwrap();

    assert!(lock.lock(&ctx).await.unwrap());
    sleep(LEASE + SLACK).await;

    let mut competitor = DistributedLock::new(store.clone(), key, LEASE_SECONDS).unwrap();
    assert!(!competitor.lock(&ctx).await.unwrap());

    ctx.cancel();
    sleep(LEASE + SLACK).await;

    let ctx = Context::new();
    let mut fresh = RenewableLock::new(store.clone(), key, LEASE_SECONDS).unwrap();
    assert!(fresh.lock(&ctx).await.unwrap());
    assert!(fresh.unlock(&ctx).await.unwrap());
    assert!(!fresh.unlock(&ctx).await.unwrap());
    ctx.cancel();
}

#[tokio::test]
#[ignore]
async fn release_checks_the_owner() {
    let store = store().await;
    let key = "rdlock:test:steal";
    let ctx = Context::new();
    let mut lock = DistributedLock::new(store.clone(), key, LEASE_SECONDS).unwrap();

    assert!(lock.lock(&ctx).await.unwrap());
    // the key is taken over once our lease lapses
    let mut thief = DistributedLock::new(store.clone(), key, LEASE_SECONDS).unwrap();
    sleep(LEASE + SLACK).await;
    assert!(thief.lock(&ctx).await.unwrap());

    assert!(!lock.unlock(&ctx).await.unwrap());
    assert!(thief.unlock(&ctx).await.unwrap());
}

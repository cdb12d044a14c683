use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;

use crate::error::StoreError;

use super::{InMemoryStore, KeyValueStore};

/// An in-memory store that can be switched into failing every call, or
/// into never answering at all.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: InMemoryStore,
    failing: AtomicBool,
    stalled: AtomicBool,
    pub(crate) refreshes: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    async fn check(&self) -> Result<(), StoreError> {
        if self.stalled.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.check().await?;
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        self.check().await?;
        self.inner.delete_if_equals(key, expected).await
    }

    async fn refresh_expiry(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.check().await?;
        self.inner.refresh_expiry(key, ttl).await
    }

    async fn refresh_expiry_if_equals(
        &self,
        key: &str,
        expected: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.check().await?;
        self.inner.refresh_expiry_if_equals(key, expected, ttl).await
    }
}

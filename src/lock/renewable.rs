use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::trace;

use crate::{
    config::LockConfig,
    error::LockError,
    store::KeyValueStore,
    util::{runnable::run_with_fixed_delay, Context},
};

use super::{
    renewer::{renewal_period, LeaseRenewer},
    sink::{ErrorSink, LogSink},
    DistributedLock,
};

/// A [`DistributedLock`] whose lease is kept alive in the background.
///
/// Each successful `lock` spawns a task that renews the lease every two
/// thirds of its duration. The task runs until the context given to `lock`
/// is cancelled or the store says the lease is gone. `unlock` does not stop
/// it, so cancel that context when you are done with the lock.
pub struct RenewableLock {
    inner: DistributedLock,
    sink: Arc<dyn ErrorSink>,
    renewal: Option<JoinHandle<()>>,
}

impl RenewableLock {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        lease_seconds: u64,
    ) -> Result<Self, LockError> {
        Self::from_config(store, LockConfig::new(key, lease_seconds))
    }

    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        config: LockConfig,
    ) -> Result<Self, LockError> {
        Ok(Self {
            inner: DistributedLock::from_config(store, config)?,
            sink: Arc::new(LogSink),
            renewal: None,
        })
    }

    /// Send background renewal failures to `sink` instead of the log.
    pub fn with_error_sink(mut self, sink: impl ErrorSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn key(&self) -> &str {
        self.inner.key()
    }

    pub fn lease(&self) -> Duration {
        self.inner.lease()
    }

    pub fn is_held(&self) -> bool {
        self.inner.is_held()
    }

    /// Whether the renewal task from the last successful `lock` is running.
    pub fn is_renewing(&self) -> bool {
        self.renewal
            .as_ref()
            .map_or(false, |renewal| !renewal.is_finished())
    }

    pub async fn lock(&mut self, ctx: &Context) -> Result<bool, LockError> {
        if !self.inner.lock(ctx).await? {
            return Ok(false);
        }

        if let Some(previous) = self.renewal.take() {
            previous.abort();
        }
        let renewer = Arc::new(LeaseRenewer::new(self.inner.renewal_copy(), self.sink.clone()));
        let period = renewal_period(self.inner.lease());
        trace!(key = self.inner.key(), period = ?period, "starting lease renewal");
        self.renewal = Some(tokio::spawn(run_with_fixed_delay(
            renewer,
            period,
            ctx.clone(),
        )));
        Ok(true)
    }

    pub async fn unlock(&mut self, ctx: &Context) -> Result<bool, LockError> {
        self.inner.unlock(ctx).await
    }
}

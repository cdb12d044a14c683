use std::{ops::ControlFlow, sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::{
    error::LockError,
    util::{runnable::PeriodicRunnable, Context},
};

use super::{sink::ErrorSink, DistributedLock};

/// Wake period for a lease of `lease`: two thirds of it.
pub(crate) fn renewal_period(lease: Duration) -> Duration {
    // divide first so the longest leases cannot overflow
    lease / 3 * 2
}

pub(crate) struct LeaseRenewer {
    lock: DistributedLock,
    sink: Arc<dyn ErrorSink>,
}

impl LeaseRenewer {
    pub(crate) fn new(lock: DistributedLock, sink: Arc<dyn ErrorSink>) -> Self {
        Self { lock, sink }
    }
}

#[async_trait]
impl PeriodicRunnable for LeaseRenewer {
    async fn run_once(&self, ctx: &Context) -> ControlFlow<()> {
        match self.lock.renew(ctx).await {
            Ok(true) => ControlFlow::Continue(()),
            Ok(false) => {
                debug!(key = self.lock.key(), "lease already gone, stopping renewal");
                ControlFlow::Break(())
            }
            Err(LockError::Cancelled { .. }) => ControlFlow::Break(()),
            Err(err) => {
                // only a missing lease ends renewal; errors are retried next wake
                self.sink.report(err);
                ControlFlow::Continue(())
            }
        }
    }

    async fn before_shutdown_complete(&self) {
        trace!(key = self.lock.key(), "renewal task stopped");
    }
}

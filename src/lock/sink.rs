use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::error::LockError;

/// Receives failures from a background renewal task.
///
/// Renewal runs after `lock` has already returned, so its errors have no
/// caller to propagate to. A sink is where they go instead.
pub trait ErrorSink: Send + Sync + 'static {
    fn report(&self, error: LockError);
}

/// Logs every failure as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: LockError) {
        warn!(error = %error, "lease renewal failed");
    }
}

/// Forwards every failure to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub UnboundedSender<LockError>);

impl ErrorSink for ChannelSink {
    fn report(&self, error: LockError) {
        // a dropped receiver means nobody is listening any more
        let _ = self.0.send(error);
    }
}

impl<F> ErrorSink for F
where
    F: Fn(LockError) + Send + Sync + 'static,
{
    fn report(&self, error: LockError) {
        self(error)
    }
}

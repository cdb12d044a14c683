use std::{ops::ControlFlow, sync::Arc, time::Duration};

use async_trait::async_trait;

use super::Context;

/// Runs `runnable` every `delay` until it asks to stop or `ctx` is done.
///
/// The first run happens one `delay` after the call, and each following
/// delay starts once the previous run has finished.
pub(crate) async fn run_with_fixed_delay<T: PeriodicRunnable>(
    runnable: Arc<T>,
    delay: Duration,
    ctx: Context,
) {
    loop {
        let mut shutdown_signal = false;
        tokio::select! {
            _ = ctx.cancelled() => { shutdown_signal = true }
            _ = tokio::time::sleep(delay) => {}
        }

        if !shutdown_signal {
            tokio::select! {
                _ = ctx.cancelled() => { shutdown_signal = true }
                flow = runnable.run_once(&ctx) => {
                    if flow.is_break() {
                        shutdown_signal = true;
                    }
                }
            }
        }

        if shutdown_signal {
            break;
        }
    }

    runnable.before_shutdown_complete().await;
}

#[async_trait]
pub(crate) trait PeriodicRunnable: Send + Sync {
    async fn run_once(&self, ctx: &Context) -> ControlFlow<()>;
    async fn before_shutdown_complete(&self) {}
}

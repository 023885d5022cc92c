//! Background sweep of expired refresh tokens

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use super::context::ServiceContext;
use super::refresh_token::RefreshTokenManager;

/// Handle to a running reaper task
#[derive(Debug)]
pub struct ReaperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Stop the reaper and wait for an in-flight sweep to finish
    pub async fn shutdown(self) {
        // The task may already be gone if the runtime is shutting down
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Reaper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a task that purges expired tokens every `period`
///
/// The first sweep runs immediately. Store failures are logged and the next
/// tick tries again.
pub fn spawn_reaper(ctx: ServiceContext, period: Duration) -> ReaperHandle {
    let (stop, mut stopped) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_secs = period.as_secs_f64(), "Refresh token reaper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match RefreshTokenManager::new(&ctx).purge_expired().await {
                        Ok(0) => debug!("No expired refresh tokens"),
                        Ok(purged) => info!(purged, "Purged expired refresh tokens"),
                        Err(e) => error!(error = %e, "Failed to purge expired refresh tokens"),
                    }
                }
                _ = stopped.changed() => break,
            }
        }

        info!("Refresh token reaper stopped");
    });

    ReaperHandle { stop, task }
}

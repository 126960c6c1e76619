use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    futures::FutureExt,
    tokio::{task::JoinHandle, time::MissedTickBehavior},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

#[async_trait]
pub trait PeriodicJob: Send + Sync {
    fn name(&self) -> &str;

    fn interval(&self) -> Duration;

    /// Jobs with nothing to do are never scheduled.
    fn is_enabled(&self) -> bool {
        true
    }

    async fn run_once(&self) -> anyhow::Result<()>;
}

/// Start `job` on its own task.
///
/// The first iteration runs one interval after spawning. Cancelling `cancel`
/// stops further ticks; an iteration already running is allowed to finish.
/// Returns `None` when the job is disabled.
pub fn spawn_job(job: Arc<dyn PeriodicJob>, cancel: CancellationToken) -> Option<JoinHandle<()>> {
    if !job.is_enabled() {
        info!(job = job.name(), "periodic job has nothing to do, not scheduling");
        return None;
    }
    let interval = job.interval();
    if interval.is_zero() {
        warn!(job = job.name(), "periodic job has a zero interval, not scheduling");
        return None;
    }
    info!(job = job.name(), interval_secs = interval.as_secs(), "periodic job scheduled");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(job = job.name(), "periodic job stopped");
                    break;
                }
                _ = ticker.tick() => {
                    run_iteration(job.as_ref()).await;
                }
            }
        }
    }))
}

async fn run_iteration(job: &dyn PeriodicJob) {
    match AssertUnwindSafe(job.run_once()).catch_unwind().await {
        Ok(Ok(())) => debug!(job = job.name(), "periodic job iteration finished"),
        Ok(Err(e)) => warn!(job = job.name(), "periodic job iteration failed: {e:#}"),
        Err(_) => warn!(job = job.name(), "periodic job iteration panicked"),
    }
}

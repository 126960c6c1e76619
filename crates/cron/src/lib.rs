//! Periodic jobs driven by the relay.
//!
//! Each job runs as one tokio task: wait for the next tick, run a single
//! iteration inside its own error boundary, repeat until cancelled.

pub mod broadcaster;
pub mod job;
pub mod restart;
pub mod schedule;

pub use {
    broadcaster::Broadcaster,
    job::{PeriodicJob, spawn_job},
    restart::RestartNotifier,
    schedule::{CronRestartSchedule, RestartSchedule, ScheduledRestart},
};

use std::sync::Arc;

use {
    polychat_config::PolychatConfig, polychat_relay::RelayService, tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
};

/// Build the broadcaster and restart notifier from `config` and start every
/// job that has work to do. An invalid restart schedule fails before anything
/// is spawned.
pub fn spawn_jobs(
    relay: Arc<RelayService>,
    config: &PolychatConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<Vec<JoinHandle<()>>> {
    let mut jobs: Vec<Arc<dyn PeriodicJob>> =
        vec![Arc::new(Broadcaster::new(Arc::clone(&relay), &config.broadcast))];
    let schedule = CronRestartSchedule::from_config(&config.restarts)?;
    if schedule.is_empty() {
        tracing::debug!("no restart schedules configured");
    } else {
        jobs.push(Arc::new(RestartNotifier::new(
            relay,
            Arc::new(schedule),
            config.restarts.check_interval(),
        )));
    }
    Ok(jobs
        .into_iter()
        .filter_map(|job| spawn_job(job, cancel.clone()))
        .collect())
}

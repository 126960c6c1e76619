use std::{str::FromStr, time::Duration};

use {
    anyhow::Context,
    async_trait::async_trait,
    chrono::{DateTime, TimeDelta, Utc},
    polychat_config::RestartConfig,
    polychat_relay::ServerId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRestart {
    pub server_id: ServerId,
    pub at: DateTime<Utc>,
}

/// Source of upcoming server restarts.
#[async_trait]
pub trait RestartSchedule: Send + Sync {
    /// Restarts that should be announced as of `now`.
    async fn upcoming(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<ScheduledRestart>>;
}

/// Restart times computed from per-server cron expressions, in UTC.
pub struct CronRestartSchedule {
    entries: Vec<(ServerId, cron::Schedule)>,
    window: TimeDelta,
}

impl CronRestartSchedule {
    pub fn from_config(config: &RestartConfig) -> anyhow::Result<Self> {
        let mut entries = Vec::with_capacity(config.schedules.len());
        for entry in &config.schedules {
            let id = ServerId::parse(&entry.server_id)
                .with_context(|| format!("invalid restart server id {:?}", entry.server_id))?;
            let schedule = cron::Schedule::from_str(&entry.cron)
                .with_context(|| format!("invalid cron expression for {id}: {}", entry.cron))?;
            entries.push((id, schedule));
        }
        Self::new(entries, config.warn_within())
    }

    pub fn new(entries: Vec<(ServerId, cron::Schedule)>, window: Duration) -> anyhow::Result<Self> {
        let window = TimeDelta::from_std(window).context("restart warning window too large")?;
        Ok(Self { entries, window })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next restart of every configured server, sorted by time.
    #[must_use]
    pub fn next_restarts(&self, now: DateTime<Utc>) -> Vec<ScheduledRestart> {
        let mut restarts: Vec<ScheduledRestart> = self
            .entries
            .iter()
            .filter_map(|(id, schedule)| {
                schedule.after(&now).next().map(|at| ScheduledRestart {
                    server_id: id.clone(),
                    at,
                })
            })
            .collect();
        restarts.sort_by_key(|r| r.at);
        restarts
    }
}

#[async_trait]
impl RestartSchedule for CronRestartSchedule {
    async fn upcoming(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<ScheduledRestart>> {
        Ok(self
            .next_restarts(now)
            .into_iter()
            .filter(|r| r.at - now <= self.window)
            .collect())
    }
}

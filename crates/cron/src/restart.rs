use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    polychat_protocol::{ChatMessage, Message, RELAY_ORIGIN_ID},
    polychat_relay::RelayService,
    tracing::{info, warn},
};

use crate::{PeriodicJob, RestartSchedule};

const RESTART_PREFIX: &str = "\u{a7}c[Restart]\u{a7}r";

/// Warns each server with an upcoming restart, addressing only that server.
pub struct RestartNotifier {
    relay: Arc<RelayService>,
    schedule: Arc<dyn RestartSchedule>,
    interval: Duration,
}

impl RestartNotifier {
    #[must_use]
    pub fn new(
        relay: Arc<RelayService>,
        schedule: Arc<dyn RestartSchedule>,
        interval: Duration,
    ) -> Self {
        Self {
            relay,
            schedule,
            interval,
        }
    }

    /// One pass as of `now`. Returns how many warnings were delivered.
    pub async fn notify_at(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let mut delivered = 0;
        for restart in self.schedule.upcoming(now).await? {
            let Some(server) = self.relay.registry().get(&restart.server_id) else {
                warn!(server_id = %restart.server_id, "restart scheduled for offline server, skipping");
                continue;
            };
            let Ok(remaining) = (restart.at - now).to_std() else {
                continue;
            };
            let warning = Message::ChatMessage(ChatMessage {
                server_id: RELAY_ORIGIN_ID.into(),
                message: format!("{RESTART_PREFIX} Server restarts in {}", describe_remaining(remaining)),
                message_offset: RESTART_PREFIX.len() as u32,
            });
            let envelope = warning.to_envelope()?;
            if self.relay.send(&server, &envelope).await {
                delivered += 1;
                info!(server_id = %restart.server_id, remaining_secs = remaining.as_secs(), "restart warning sent");
            } else {
                warn!(server_id = %restart.server_id, "restart warning not delivered");
            }
        }
        Ok(delivered)
    }
}

#[async_trait]
impl PeriodicJob for RestartNotifier {
    fn name(&self) -> &str {
        "restart-notifier"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run_once(&self) -> anyhow::Result<()> {
        self.notify_at(Utc::now()).await.map(|_| ())
    }
}

/// `45 seconds`, `1 minute`, `12 minutes` (minutes rounded up).
#[must_use]
pub fn describe_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    if secs < 60 {
        return if secs == 1 {
            "1 second".into()
        } else {
            format!("{secs} seconds")
        };
    }
    let minutes = secs.div_ceil(60);
    if minutes == 1 {
        "1 minute".into()
    } else {
        format!("{minutes} minutes")
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(0, "0 seconds")]
    #[case(1, "1 second")]
    #[case(45, "45 seconds")]
    #[case(60, "1 minute")]
    #[case(299, "5 minutes")]
    #[case(600, "10 minutes")]
    fn remaining_time_wording(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(describe_remaining(Duration::from_secs(secs)), expected);
    }
}

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use {
    async_trait::async_trait,
    polychat_config::BroadcastConfig,
    polychat_protocol::{ChatMessage, Message, RELAY_ORIGIN_ID},
    polychat_relay::RelayService,
    tracing::info,
};

use crate::PeriodicJob;

/// Broadcasts a rotating list of announcements to every server.
pub struct Broadcaster {
    relay: Arc<RelayService>,
    interval: Duration,
    prefix: String,
    messages: Vec<String>,
    next: AtomicUsize,
}

impl Broadcaster {
    #[must_use]
    pub fn new(relay: Arc<RelayService>, config: &BroadcastConfig) -> Self {
        Self {
            relay,
            interval: config.interval(),
            prefix: config.prefix.clone(),
            messages: config
                .messages
                .iter()
                .filter(|m| !m.trim().is_empty())
                .cloned()
                .collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Next rotation entry; advances the cursor.
    pub fn next_announcement(&self) -> Option<Message> {
        if self.messages.is_empty() {
            return None;
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.messages.len();
        let text = &self.messages[idx];
        let (message, message_offset) = if self.prefix.is_empty() {
            (text.clone(), 0)
        } else {
            (format!("{} {text}", self.prefix), self.prefix.len() as u32)
        };
        Some(Message::ChatMessage(ChatMessage {
            server_id: RELAY_ORIGIN_ID.into(),
            message,
            message_offset,
        }))
    }
}

#[async_trait]
impl PeriodicJob for Broadcaster {
    fn name(&self) -> &str {
        "broadcaster"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn is_enabled(&self) -> bool {
        !self.messages.is_empty()
    }

    async fn run_once(&self) -> anyhow::Result<()> {
        let Some(announcement) = self.next_announcement() else {
            return Ok(());
        };
        let delivered = self.relay.broadcast_message(&announcement).await;
        info!(delivered, "broadcast sent");
        Ok(())
    }
}

use std::sync::Arc;

use {
    polychat_config::DiscordConfig,
    polychat_relay::RelayService,
    secrecy::ExposeSecret,
    serenity::all::{ChannelId, GuildId},
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use crate::{
    DiscordHub, Error, Result, Sanitizer,
    handler::{Handler, required_intents},
};

/// A running gateway connection plus the hub used to post into the guild.
pub struct DiscordBridge {
    hub: Arc<DiscordHub>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl DiscordBridge {
    /// Connect to the gateway in a background task.
    ///
    /// The returned hub can post as soon as this returns; inbound relay
    /// channel messages flow once the gateway is ready.
    pub async fn start(
        config: &DiscordConfig,
        relay: Arc<RelayService>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let token = config.token.expose_secret();
        if token.is_empty() {
            return Err(Error::Config("Discord bot token is required".into()));
        }
        if config.relay_channel_id == 0 {
            return Err(Error::Config("relay_channel_id is required".into()));
        }
        let relay_channel = ChannelId::new(config.relay_channel_id);

        let handler = Handler {
            relay,
            relay_channel,
            sanitizer: Sanitizer::new()?,
            unknown_user: config.unknown_user,
            guild_id: (config.guild_id != 0).then(|| GuildId::new(config.guild_id)),
        };
        let mut client = serenity::Client::builder(token, required_intents())
            .event_handler(handler)
            .await?;
        let hub = Arc::new(DiscordHub::new(Arc::clone(&client.http), relay_channel));

        info!(%relay_channel, "starting discord gateway");
        let cancel_for_task = cancel.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                result = client.start() => {
                    if let Err(e) = result {
                        warn!("Discord client stopped with error: {e}");
                    }
                }
                () = cancel_for_task.cancelled() => {
                    info!("Discord client shutting down");
                    client.shard_manager.shutdown_all().await;
                }
            }
        });

        Ok(Self { hub, cancel, task })
    }

    #[must_use]
    pub fn hub(&self) -> Arc<DiscordHub> {
        Arc::clone(&self.hub)
    }

    /// Disconnect and wait for the gateway task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Discord gateway task failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use {polychat_relay::ServerRegistry, secrecy::Secret};

    use super::*;

    fn relay() -> Arc<RelayService> {
        Arc::new(RelayService::new(Arc::new(ServerRegistry::new())))
    }

    #[tokio::test]
    async fn start_requires_a_token() {
        let config = DiscordConfig {
            relay_channel_id: 1,
            ..DiscordConfig::default()
        };
        let result = DiscordBridge::start(&config, relay(), CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("token")));
    }

    #[tokio::test]
    async fn start_requires_a_relay_channel() {
        let config = DiscordConfig {
            token: Secret::new("not-a-real-token".into()),
            ..DiscordConfig::default()
        };
        let result = DiscordBridge::start(&config, relay(), CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("relay_channel_id")));
    }
}

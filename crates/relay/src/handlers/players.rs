use std::sync::Arc;

use {
    async_trait::async_trait,
    polychat_protocol::{Message, MessageKind, PlayerStatus},
    tracing::{debug, info},
};

use super::unexpected;
use crate::{Error, HubPost, MessageHandler, RelayContext, Result, ServerId, TransportClient, format};

/// Replaces a registered server's full roster.
pub struct PlayersOnlineHandler;

#[async_trait]
impl MessageHandler for PlayersOnlineHandler {
    async fn handle(
        &self,
        ctx: &RelayContext,
        _client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()> {
        let Message::ServerPlayersOnline(roster) = message else {
            return Err(unexpected(MessageKind::ServerPlayersOnline, message.kind()));
        };
        let id = ServerId::normalize(&roster.server_id);
        let reported = roster.players_online as usize;
        let record = ctx
            .registry
            .update(&id, |record| record.set_online_players(roster.player_names))
            .ok_or_else(|| Error::not_found(&id))?;

        if record.players_online() != reported {
            debug!(
                server_id = %id,
                reported,
                listed = record.players_online(),
                "player count disagrees with roster, using roster"
            );
        }
        info!(server_id = %id, players_online = record.players_online(), "roster replaced");
        Ok(())
    }
}

/// Applies a single join or leave, forwards it and tells the hub.
pub struct PlayerStatusChangedHandler;

#[async_trait]
impl MessageHandler for PlayerStatusChangedHandler {
    async fn handle(
        &self,
        ctx: &RelayContext,
        _client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()> {
        let Message::ServerPlayerStatusChangedEvent(mut event) = message else {
            return Err(unexpected(
                MessageKind::ServerPlayerStatusChangedEvent,
                message.kind(),
            ));
        };
        let id = ServerId::normalize(&event.server_id);
        let username = event.player_username.clone();
        let status = event.new_player_status;

        let mut changed = false;
        let record = ctx
            .registry
            .update(&id, |record| {
                changed = match status {
                    PlayerStatus::Joined => record.player_joined(&username),
                    PlayerStatus::Left => record.player_left(&username),
                };
            })
            .ok_or_else(|| Error::not_found(&id))?;

        if !changed {
            debug!(server_id = %id, player = %username, ?status, "roster already reflected change");
        }
        if record.players_online() != event.new_players_online as usize {
            debug!(
                server_id = %id,
                reported = event.new_players_online,
                listed = record.players_online(),
                "player count disagrees with roster, using roster"
            );
        }
        event.server_id = id.to_string();
        event.new_players_online = u32::try_from(record.players_online()).unwrap_or(u32::MAX);

        ctx.relay
            .forward_message(&id, &Message::ServerPlayerStatusChangedEvent(event))
            .await;
        info!(
            server_id = %id,
            player = %username,
            ?status,
            players_online = record.players_online(),
            "player status changed"
        );
        ctx.notify_hub(HubPost::relay(format::player_notice(
            &username,
            status,
            record.display_name(),
        )))
        .await;
        Ok(())
    }
}

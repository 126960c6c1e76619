use std::sync::Arc;

use {
    async_trait::async_trait,
    polychat_protocol::{Message, MessageKind, ServerState},
    tracing::{info, warn},
};

use super::unexpected;
use crate::{
    Error, HubPost, MessageHandler, RelayContext, Result, ServerId, TransportClient, format,
};

/// Forwards lifecycle announcements and removes stopped or crashed servers.
pub struct ServerStatusHandler;

#[async_trait]
impl MessageHandler for ServerStatusHandler {
    async fn handle(
        &self,
        ctx: &RelayContext,
        client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()> {
        let Message::ServerStatus(mut status) = message else {
            return Err(unexpected(MessageKind::ServerStatus, message.kind()));
        };
        let id = ServerId::normalize(&status.server_id);
        status.server_id = id.to_string();
        let state = status.status;

        let Some(record) = ctx.registry.get(&id) else {
            if state.is_terminal() {
                return Err(Error::not_found(&id));
            }
            // ServerInfo may still be in flight on another handler.
            warn!(server_id = %id, "server announced start before registering");
            return Ok(());
        };

        // Only the connection bound to the record may remove it, and only
        // before fan-out yields.
        if state.is_terminal() {
            if ctx.registry.remove_for_client(&id, client).is_none() {
                warn!(
                    server_id = %id,
                    peer = %client.peer(),
                    "stop from a superseded connection ignored"
                );
                client.stop_listening().await;
                return Ok(());
            }
            info!(server_id = %id, "server removed from registry");
        }

        let delivered = ctx
            .relay
            .forward_message(&id, &Message::ServerStatus(status))
            .await;
        info!(server_id = %id, %state, delivered, "server status changed");
        if state.is_terminal() {
            client.stop_listening().await;
        }

        ctx.notify_hub(HubPost::relay(format::status_notice(
            record.display_name(),
            state,
        )))
        .await;
        if state == ServerState::Crashed {
            warn!(server_id = %id, "server reported a crash");
        }
        Ok(())
    }
}

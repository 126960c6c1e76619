use std::sync::Arc;

use {
    async_trait::async_trait,
    polychat_protocol::{Message, MessageKind},
    tracing::info,
};

use super::unexpected;
use crate::{
    ClientHandle, Error, MessageHandler, RelayContext, Result, ServerId, ServerRecord,
    TransportClient,
};

/// Registers (or re-registers) the sending server.
pub struct ServerInfoHandler;

#[async_trait]
impl MessageHandler for ServerInfoHandler {
    async fn handle(
        &self,
        ctx: &RelayContext,
        client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()> {
        let Message::ServerInfo(info) = message else {
            return Err(unexpected(MessageKind::ServerInfo, message.kind()));
        };
        let id = ServerId::parse(&info.server_id)
            .ok_or_else(|| Error::InvalidServerId(info.server_id.clone()))?;

        let record = ServerRecord::new(
            id.clone(),
            info.server_name,
            info.server_address,
            info.max_players,
            ClientHandle::new(client),
        );
        let name = record.name().to_string();
        match ctx.registry.upsert(record) {
            Some(_) => info!(server_id = %id, server_name = %name, peer = %client.peer(), "server re-registered"),
            None => info!(server_id = %id, server_name = %name, peer = %client.peer(), "server registered"),
        }
        Ok(())
    }
}

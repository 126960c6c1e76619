use std::sync::Arc;

use {
    async_trait::async_trait,
    polychat_protocol::{Message, MessageKind},
    tracing::debug,
};

use super::unexpected;
use crate::{HubPost, MessageHandler, RelayContext, Result, ServerId, TransportClient, format};

/// Forwards chat to every other server and mirrors it into the hub.
pub struct ChatMessageHandler;

#[async_trait]
impl MessageHandler for ChatMessageHandler {
    async fn handle(
        &self,
        ctx: &RelayContext,
        _client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()> {
        let Message::ChatMessage(chat) = message else {
            return Err(unexpected(MessageKind::ChatMessage, message.kind()));
        };
        let origin = ServerId::normalize(&chat.server_id);
        let line = format::hub_chat_line(&chat);

        let delivered = ctx
            .relay
            .forward_message(&origin, &Message::ChatMessage(chat))
            .await;
        debug!(server_id = %origin, delivered, "chat forwarded");

        if !line.is_empty() {
            ctx.notify_hub(HubPost::relay(line)).await;
        }
        Ok(())
    }
}

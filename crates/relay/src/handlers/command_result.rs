use std::sync::Arc;

use {
    async_trait::async_trait,
    polychat_protocol::{Message, MessageKind},
    tracing::debug,
};

use super::unexpected;
use crate::{
    HubPost, HubTarget, MessageHandler, RelayContext, Result, ServerId, TransportClient, format,
};

/// Posts command output into the hub channel the command came from.
pub struct CommandResultHandler;

#[async_trait]
impl MessageHandler for CommandResultHandler {
    async fn handle(
        &self,
        ctx: &RelayContext,
        _client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()> {
        let Message::GenericCommandResult(result) = message else {
            return Err(unexpected(MessageKind::GenericCommandResult, message.kind()));
        };
        let server_id = ServerId::normalize(&result.server_id);
        let target = HubTarget::from_channel_id(&result.discord_channel_id);
        debug!(%server_id, command = %result.command, ?target, "command result received");

        ctx.notify_hub(HubPost {
            target,
            text: format::command_result_text(
                server_id.as_str(),
                &result.command,
                &result.command_output,
            ),
            colour: Some(result.colour),
        })
        .await;
        Ok(())
    }
}

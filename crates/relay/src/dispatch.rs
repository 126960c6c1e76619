use std::{collections::HashMap, sync::Arc};

use {
    async_trait::async_trait,
    polychat_protocol::{Message, MessageKind},
    tracing::debug,
};

use crate::{
    ChatHub, Error, HubPost, RelayService, Result, ServerRegistry, TransportClient, handlers,
};

/// Shared state every inbound handler works against.
pub struct RelayContext {
    pub registry: Arc<ServerRegistry>,
    pub relay: Arc<RelayService>,
    pub hub: Arc<dyn ChatHub>,
}

impl RelayContext {
    /// Post to the chat hub, logging instead of failing.
    pub async fn notify_hub(&self, post: HubPost) {
        if let Err(e) = self.hub.post(post).await {
            tracing::warn!("failed to post to chat hub: {e}");
        }
    }
}

/// Handles one inbound message kind.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// `client` is the connection the message arrived on.
    async fn handle(
        &self,
        ctx: &RelayContext,
        client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()>;
}

/// Message kind → handler table, built once at startup.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<MessageKind, Box<dyn MessageHandler>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with a handler for every inbound kind. Outbound-only kinds are
    /// left unregistered.
    #[must_use]
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(MessageKind::ServerInfo, handlers::ServerInfoHandler);
        dispatcher.register(MessageKind::ServerStatus, handlers::ServerStatusHandler);
        dispatcher.register(
            MessageKind::ServerPlayersOnline,
            handlers::PlayersOnlineHandler,
        );
        dispatcher.register(
            MessageKind::ServerPlayerStatusChangedEvent,
            handlers::PlayerStatusChangedHandler,
        );
        dispatcher.register(MessageKind::ChatMessage, handlers::ChatMessageHandler);
        dispatcher.register(
            MessageKind::GenericCommandResult,
            handlers::CommandResultHandler,
        );
        dispatcher
    }

    /// Install or replace the handler for `kind`.
    pub fn register(&mut self, kind: MessageKind, handler: impl MessageHandler + 'static) {
        self.handlers.insert(kind, Box::new(handler));
    }

    #[must_use]
    pub fn handles(&self, kind: MessageKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub async fn dispatch(
        &self,
        ctx: &RelayContext,
        client: &Arc<dyn TransportClient>,
        message: Message,
    ) -> Result<()> {
        let kind = message.kind();
        let Some(handler) = self.handlers.get(&kind) else {
            return Err(Error::Unhandled(kind));
        };
        debug!(%kind, peer = %client.peer(), "dispatching inbound message");
        handler.handle(ctx, client, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_inbound_kinds_only() {
        let dispatcher = Dispatcher::with_default_handlers();
        for kind in MessageKind::ALL {
            assert_eq!(
                dispatcher.handles(kind),
                !kind.is_outbound_only(),
                "{kind}"
            );
        }
    }
}

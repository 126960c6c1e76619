use std::sync::Arc;

use {
    polychat_protocol::{Envelope, Message},
    tracing::{debug, warn},
};

use crate::{
    ChatHub, Dispatcher, Error, RelayContext, RelayService, Result, ServerRegistry,
    TransportClient,
};

/// Entry point the transport layer feeds inbound frames into.
///
/// Cheap to share behind an `Arc`; every call is independent, so frames from
/// different connections can be handled in parallel.
pub struct RelayCore {
    ctx: RelayContext,
    dispatcher: Dispatcher,
}

impl RelayCore {
    /// Core with the default handler table.
    pub fn new(relay: Arc<RelayService>, hub: Arc<dyn ChatHub>) -> Self {
        Self::with_dispatcher(relay, hub, Dispatcher::with_default_handlers())
    }

    pub fn with_dispatcher(
        relay: Arc<RelayService>,
        hub: Arc<dyn ChatHub>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            ctx: RelayContext {
                registry: Arc::clone(relay.registry()),
                relay,
                hub,
            },
            dispatcher,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.ctx.registry
    }

    #[must_use]
    pub fn relay(&self) -> &Arc<RelayService> {
        &self.ctx.relay
    }

    /// Handle one decoded message. Errors are fatal for this message only.
    pub async fn handle(&self, client: &Arc<dyn TransportClient>, message: Message) -> Result<()> {
        self.dispatcher.dispatch(&self.ctx, client, message).await
    }

    /// Decode one framed envelope and handle it. Never fails: every error is
    /// logged and the frame is dropped.
    pub async fn on_frame(&self, client: &Arc<dyn TransportClient>, frame: &[u8]) {
        if let Err(e) = self.try_on_frame(client, frame).await {
            match e {
                Error::NotFound { .. } | Error::InvalidServerId(_) => {
                    warn!(peer = %client.peer(), "rejected inbound message: {e}");
                },
                _ => warn!(peer = %client.peer(), "dropped inbound frame: {e}"),
            }
        }
    }

    async fn try_on_frame(&self, client: &Arc<dyn TransportClient>, frame: &[u8]) -> Result<()> {
        let relay = &self.ctx.relay;
        let bytes = relay.framing().decode(frame, relay.max_frame_bytes())?;
        let envelope = Envelope::decode(&bytes)?;
        let message = Message::from_envelope(&envelope)?;
        debug!(type_tag = envelope.type_tag(), peer = %client.peer(), "inbound frame decoded");
        self.handle(client, message).await
    }
}

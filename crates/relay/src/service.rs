use std::sync::Arc;

use {
    bytes::Bytes,
    futures::future::join_all,
    polychat_protocol::{
        Envelope, Framing, GenericCommand, MAX_FRAME_BYTES, Message, PromoteMemberCommand,
    },
    tracing::{debug, error, warn},
};

use crate::{Error, Result, ServerId, ServerRecord, ServerRegistry, TransportError};

/// Best-effort delivery of envelopes to registered servers.
///
/// Send failures are logged with the destination id and swallowed; fan-out
/// keeps going after a failed destination.
#[derive(Debug)]
pub struct RelayService {
    registry: Arc<ServerRegistry>,
    framing: Framing,
    max_frame_bytes: usize,
}

impl RelayService {
    #[must_use]
    pub fn new(registry: Arc<ServerRegistry>) -> Self {
        Self {
            registry,
            framing: Framing::default(),
            max_frame_bytes: MAX_FRAME_BYTES,
        }
    }

    #[must_use]
    pub fn with_framing(mut self, framing: Framing, max_frame_bytes: usize) -> Self {
        self.framing = framing;
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn framing(&self) -> Framing {
        self.framing
    }

    #[must_use]
    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    /// Send one envelope to `destination`. Returns whether it was written.
    pub async fn send(&self, destination: &ServerRecord, envelope: &Envelope) -> bool {
        let Some(frame) = self.frame(envelope) else {
            return false;
        };
        self.deliver(destination, frame).await
    }

    /// Send to every registered server except `origin`.
    /// Returns the number of successful deliveries.
    pub async fn forward(&self, origin: &ServerId, envelope: &Envelope) -> usize {
        let destinations: Vec<ServerRecord> = self
            .registry
            .list()
            .into_iter()
            .filter(|record| record.id() != origin)
            .collect();
        self.fan_out(destinations, envelope).await
    }

    /// Send to every registered server.
    /// Returns the number of successful deliveries.
    pub async fn broadcast(&self, envelope: &Envelope) -> usize {
        self.fan_out(self.registry.list(), envelope).await
    }

    /// Encode and forward a message on behalf of `origin`.
    pub async fn forward_message(&self, origin: &ServerId, message: &Message) -> usize {
        match message.to_envelope() {
            Ok(envelope) => self.forward(origin, &envelope).await,
            Err(e) => {
                error!(kind = %message.kind(), "failed to encode message for forwarding: {e}");
                0
            },
        }
    }

    /// Encode and broadcast a message.
    pub async fn broadcast_message(&self, message: &Message) -> usize {
        match message.to_envelope() {
            Ok(envelope) => self.broadcast(&envelope).await,
            Err(e) => {
                error!(kind = %message.kind(), "failed to encode message for broadcast: {e}");
                0
            },
        }
    }

    /// Encode and send a message to one registered server.
    pub async fn send_to(&self, server_id: &ServerId, message: &Message) -> Result<bool> {
        let destination = self
            .registry
            .get(server_id)
            .ok_or_else(|| Error::not_found(server_id))?;
        let envelope = message.to_envelope()?;
        Ok(self.send(&destination, &envelope).await)
    }

    /// Ask a game server to run a command.
    pub async fn send_command(&self, server_id: &ServerId, command: GenericCommand) -> Result<bool> {
        self.send_to(server_id, &Message::GenericCommand(command))
            .await
    }

    /// Ask a game server to promote a member.
    pub async fn promote_member(
        &self,
        server_id: &ServerId,
        command: PromoteMemberCommand,
    ) -> Result<bool> {
        self.send_to(server_id, &Message::PromoteMemberCommand(command))
            .await
    }

    /// One line per server, sorted by id: `SMP: 2/20 (alice, bob)`.
    #[must_use]
    pub fn online_summary(&self) -> String {
        let mut servers = self.registry.list();
        if servers.is_empty() {
            return "No servers online".into();
        }
        servers.sort_by(|a, b| a.id().cmp(b.id()));
        servers
            .iter()
            .map(|server| {
                let mut line = format!(
                    "{}: {}/{}",
                    server.display_name(),
                    server.players_online(),
                    server.max_players()
                );
                if !server.online_players().is_empty() {
                    line.push_str(&format!(" ({})", server.online_players().join(", ")));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn fan_out(&self, destinations: Vec<ServerRecord>, envelope: &Envelope) -> usize {
        if destinations.is_empty() {
            return 0;
        }
        let Some(frame) = self.frame(envelope) else {
            return 0;
        };
        let attempts = destinations.len();
        let results = join_all(
            destinations
                .iter()
                .map(|destination| self.deliver(destination, frame.clone())),
        )
        .await;
        let delivered = results.into_iter().filter(|ok| *ok).count();
        debug!(
            type_tag = envelope.type_tag(),
            attempts, delivered, "relay fan-out finished"
        );
        delivered
    }

    fn frame(&self, envelope: &Envelope) -> Option<Bytes> {
        match self
            .framing
            .encode(&envelope.encode(), self.max_frame_bytes)
        {
            Ok(frame) => Some(frame),
            Err(e) => {
                error!(type_tag = envelope.type_tag(), "failed to frame envelope: {e}");
                None
            },
        }
    }

    async fn deliver(&self, destination: &ServerRecord, frame: Bytes) -> bool {
        let result = match destination.client().upgrade() {
            Some(client) => client.send(frame).await,
            None => Err(TransportError::Closed),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(server_id = %destination.id(), "relay send failed: {e}");
                false
            },
        }
    }
}

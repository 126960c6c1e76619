use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::TransportClient;

/// Canonical server identifier: uppercase ASCII alphanumerics, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerId(String);

impl ServerId {
    /// Uppercase `raw` and drop every character outside `[A-Z0-9_-]`.
    /// The result may be empty; see [`ServerId::parse`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self(
            raw.chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        )
    }

    /// Normalize, rejecting ids with nothing left.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let id = Self::normalize(raw);
        (!id.0.is_empty()).then_some(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-owning reference to a server's transport connection.
///
/// The transport layer owns the connection; once it drops it, sends through
/// this handle fail with [`crate::TransportError::Closed`].
#[derive(Clone)]
pub struct ClientHandle(Weak<dyn TransportClient>);

impl ClientHandle {
    #[must_use]
    pub fn new(client: &Arc<dyn TransportClient>) -> Self {
        Self(Arc::downgrade(client))
    }

    /// A handle that never resolves.
    #[must_use]
    pub fn detached() -> Self {
        Self(Weak::<Detached>::new())
    }

    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<dyn TransportClient>> {
        self.0.upgrade()
    }

    /// Whether this handle points at `client`.
    #[must_use]
    pub fn is(&self, client: &Arc<dyn TransportClient>) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), Arc::as_ptr(client))
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(client) => write!(f, "ClientHandle({})", client.peer()),
            None => f.write_str("ClientHandle(closed)"),
        }
    }
}

struct Detached;

#[async_trait::async_trait]
impl TransportClient for Detached {
    async fn send(&self, _frame: bytes::Bytes) -> Result<(), crate::TransportError> {
        Err(crate::TransportError::Closed)
    }

    async fn stop_listening(&self) {}
}

/// A currently-connected game server.
///
/// The online-player count is always derived from the roster.
#[derive(Debug, Clone)]
pub struct ServerRecord {
    id: ServerId,
    name: String,
    address: String,
    max_players: u32,
    online_players: Vec<String>,
    client: ClientHandle,
}

impl ServerRecord {
    #[must_use]
    pub fn new(
        id: ServerId,
        name: impl Into<String>,
        address: impl Into<String>,
        max_players: u32,
        client: ClientHandle,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            max_players,
            online_players: Vec::new(),
            client,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ServerId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name for human-facing text; the id when the server sent no name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    #[must_use]
    pub fn players_online(&self) -> usize {
        self.online_players.len()
    }

    #[must_use]
    pub fn online_players(&self) -> &[String] {
        &self.online_players
    }

    #[must_use]
    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// Replace the whole roster, dropping blank and repeated names.
    pub fn set_online_players(&mut self, names: impl IntoIterator<Item = String>) {
        self.online_players.clear();
        for name in names {
            if !name.trim().is_empty() && !self.online_players.contains(&name) {
                self.online_players.push(name);
            }
        }
    }

    /// Returns `false` if the player was already listed.
    pub fn player_joined(&mut self, name: &str) -> bool {
        if self.online_players.iter().any(|p| p == name) {
            return false;
        }
        self.online_players.push(name.to_string());
        true
    }

    /// Returns `false` if the player was not listed.
    pub fn player_left(&mut self, name: &str) -> bool {
        match self.online_players.iter().position(|p| p == name) {
            Some(idx) => {
                self.online_players.remove(idx);
                true
            },
            None => false,
        }
    }
}

//! Message catalog exchanged between game servers and the relay.
//!
//! Field names follow the camelCase wire spelling used by the game-side
//! plugins (`serverId`, `playerNames`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Envelope, Error, Result, TAG_NAMESPACE};

// ── Server lifecycle ─────────────────────────────────────────────────────────

/// Registration message sent once by a game server after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub server_id: String,
    pub server_name: String,
    pub server_address: String,
    pub max_players: u32,
}

/// Lifecycle state announced by a game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerState {
    Started,
    Stopped,
    Crashed,
}

impl ServerState {
    /// `true` for states after which the server leaves the registry.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Crashed)
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("started"),
            Self::Stopped => f.write_str("stopped"),
            Self::Crashed => f.write_str("crashed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub server_id: String,
    pub status: ServerState,
}

// ── Players ──────────────────────────────────────────────────────────────────

/// Full roster snapshot; replaces whatever the relay knew before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPlayersOnline {
    pub server_id: String,
    pub players_online: u32,
    #[serde(default)]
    pub player_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    Joined,
    Left,
}

/// Incremental roster change for a single player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPlayerStatusChangedEvent {
    pub server_id: String,
    pub player_username: String,
    pub new_player_status: PlayerStatus,
    pub new_players_online: u32,
}

// ── Chat and commands ────────────────────────────────────────────────────────

/// A chat line. `message_offset` is the byte offset where the sender prefix
/// (`[SMP] alice: `) ends and the typed text begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub server_id: String,
    pub message: String,
    #[serde(default)]
    pub message_offset: u32,
}

/// Command issued from the chat hub to a game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericCommand {
    pub discord_command_name: String,
    pub default_command: String,
    pub discord_channel_id: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Output of a [`GenericCommand`], addressed back to a hub channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericCommandResult {
    pub server_id: String,
    pub command: String,
    pub command_output: String,
    pub colour: u32,
    pub discord_channel_id: String,
}

/// Asks a game server to promote a member to a rank group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteMemberCommand {
    pub username: String,
    pub group: String,
}

// ── Tagged union ─────────────────────────────────────────────────────────────

/// Discriminant of [`Message`], one per type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ServerInfo,
    ServerStatus,
    ServerPlayersOnline,
    ServerPlayerStatusChangedEvent,
    ChatMessage,
    GenericCommand,
    GenericCommandResult,
    PromoteMemberCommand,
}

impl MessageKind {
    pub const ALL: [MessageKind; 8] = [
        Self::ServerInfo,
        Self::ServerStatus,
        Self::ServerPlayersOnline,
        Self::ServerPlayerStatusChangedEvent,
        Self::ChatMessage,
        Self::GenericCommand,
        Self::GenericCommandResult,
        Self::PromoteMemberCommand,
    ];

    /// Unqualified type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ServerInfo => "ServerInfo",
            Self::ServerStatus => "ServerStatus",
            Self::ServerPlayersOnline => "ServerPlayersOnline",
            Self::ServerPlayerStatusChangedEvent => "ServerPlayerStatusChangedEvent",
            Self::ChatMessage => "ChatMessage",
            Self::GenericCommand => "GenericCommand",
            Self::GenericCommandResult => "GenericCommandResult",
            Self::PromoteMemberCommand => "PromoteMemberCommand",
        }
    }

    /// Fully qualified tag carried in the envelope, e.g. `polychat.ChatMessage`.
    #[must_use]
    pub fn tag(self) -> String {
        format!("{TAG_NAMESPACE}{}", self.name())
    }

    /// Resolve a type tag. Accepts both the qualified and bare spelling.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.strip_prefix(TAG_NAMESPACE).unwrap_or(tag) {
            "ServerInfo" => Some(Self::ServerInfo),
            "ServerStatus" => Some(Self::ServerStatus),
            "ServerPlayersOnline" => Some(Self::ServerPlayersOnline),
            "ServerPlayerStatusChangedEvent" => Some(Self::ServerPlayerStatusChangedEvent),
            "ChatMessage" => Some(Self::ChatMessage),
            "GenericCommand" => Some(Self::GenericCommand),
            "GenericCommandResult" => Some(Self::GenericCommandResult),
            "PromoteMemberCommand" => Some(Self::PromoteMemberCommand),
            _ => None,
        }
    }

    /// Kinds the relay only ever sends, never handles.
    #[must_use]
    pub fn is_outbound_only(self) -> bool {
        matches!(self, Self::GenericCommand | Self::PromoteMemberCommand)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every message the relay understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    ServerInfo(ServerInfo),
    ServerStatus(ServerStatus),
    ServerPlayersOnline(ServerPlayersOnline),
    ServerPlayerStatusChangedEvent(ServerPlayerStatusChangedEvent),
    ChatMessage(ChatMessage),
    GenericCommand(GenericCommand),
    GenericCommandResult(GenericCommandResult),
    PromoteMemberCommand(PromoteMemberCommand),
}

impl Message {
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::ServerInfo(_) => MessageKind::ServerInfo,
            Self::ServerStatus(_) => MessageKind::ServerStatus,
            Self::ServerPlayersOnline(_) => MessageKind::ServerPlayersOnline,
            Self::ServerPlayerStatusChangedEvent(_) => MessageKind::ServerPlayerStatusChangedEvent,
            Self::ChatMessage(_) => MessageKind::ChatMessage,
            Self::GenericCommand(_) => MessageKind::GenericCommand,
            Self::GenericCommandResult(_) => MessageKind::GenericCommandResult,
            Self::PromoteMemberCommand(_) => MessageKind::PromoteMemberCommand,
        }
    }

    /// Server id the message originates from, for kinds that carry one.
    #[must_use]
    pub fn server_id(&self) -> Option<&str> {
        match self {
            Self::ServerInfo(m) => Some(&m.server_id),
            Self::ServerStatus(m) => Some(&m.server_id),
            Self::ServerPlayersOnline(m) => Some(&m.server_id),
            Self::ServerPlayerStatusChangedEvent(m) => Some(&m.server_id),
            Self::ChatMessage(m) => Some(&m.server_id),
            Self::GenericCommandResult(m) => Some(&m.server_id),
            Self::GenericCommand(_) | Self::PromoteMemberCommand(_) => None,
        }
    }

    /// Serialize the payload and wrap it in an envelope.
    pub fn to_envelope(&self) -> Result<Envelope> {
        let payload = match self {
            Self::ServerInfo(m) => serde_json::to_vec(m)?,
            Self::ServerStatus(m) => serde_json::to_vec(m)?,
            Self::ServerPlayersOnline(m) => serde_json::to_vec(m)?,
            Self::ServerPlayerStatusChangedEvent(m) => serde_json::to_vec(m)?,
            Self::ChatMessage(m) => serde_json::to_vec(m)?,
            Self::GenericCommand(m) => serde_json::to_vec(m)?,
            Self::GenericCommandResult(m) => serde_json::to_vec(m)?,
            Self::PromoteMemberCommand(m) => serde_json::to_vec(m)?,
        };
        Ok(Envelope::new(self.kind().tag(), payload))
    }

    /// Unwrap an envelope into a typed message.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self> {
        let kind = MessageKind::from_tag(envelope.type_tag())
            .ok_or_else(|| Error::UnknownKind(envelope.type_tag().to_string()))?;
        let bytes = envelope.payload();
        Ok(match kind {
            MessageKind::ServerInfo => Self::ServerInfo(serde_json::from_slice(bytes)?),
            MessageKind::ServerStatus => Self::ServerStatus(serde_json::from_slice(bytes)?),
            MessageKind::ServerPlayersOnline => {
                Self::ServerPlayersOnline(serde_json::from_slice(bytes)?)
            },
            MessageKind::ServerPlayerStatusChangedEvent => {
                Self::ServerPlayerStatusChangedEvent(serde_json::from_slice(bytes)?)
            },
            MessageKind::ChatMessage => Self::ChatMessage(serde_json::from_slice(bytes)?),
            MessageKind::GenericCommand => Self::GenericCommand(serde_json::from_slice(bytes)?),
            MessageKind::GenericCommandResult => {
                Self::GenericCommandResult(serde_json::from_slice(bytes)?)
            },
            MessageKind::PromoteMemberCommand => {
                Self::PromoteMemberCommand(serde_json::from_slice(bytes)?)
            },
        })
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Message {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_payload!(
    ServerInfo,
    ServerStatus,
    ServerPlayersOnline,
    ServerPlayerStatusChangedEvent,
    ChatMessage,
    GenericCommand,
    GenericCommandResult,
    PromoteMemberCommand,
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_namespaced_and_resolve_back() {
        for kind in MessageKind::ALL {
            let tag = kind.tag();
            assert!(tag.starts_with("polychat."), "{tag}");
            assert_eq!(MessageKind::from_tag(&tag), Some(kind));
        }
    }

    #[test]
    fn bare_tag_resolves() {
        assert_eq!(
            MessageKind::from_tag("ChatMessage"),
            Some(MessageKind::ChatMessage)
        );
        assert_eq!(MessageKind::from_tag("polychat.Nope"), None);
    }

    #[test]
    fn server_info_uses_camel_case_fields() {
        let value = serde_json::to_value(ServerInfo {
            server_id: "SMP".into(),
            server_name: "Survival".into(),
            server_address: "mc.example.org".into(),
            max_players: 20,
        })
        .unwrap();
        assert_eq!(value["serverId"], "SMP");
        assert_eq!(value["serverAddress"], "mc.example.org");
        assert_eq!(value["maxPlayers"], 20);
    }

    #[test]
    fn status_values_are_upper_case_on_the_wire() {
        let status: ServerStatus =
            serde_json::from_str(r#"{"serverId":"smp","status":"CRASHED"}"#).unwrap();
        assert_eq!(status.status, ServerState::Crashed);
        assert!(status.status.is_terminal());
        assert!(!ServerState::Started.is_terminal());
    }

    #[test]
    fn chat_message_offset_defaults_to_zero() {
        let chat: ChatMessage =
            serde_json::from_str(r#"{"serverId":"smp","message":"hi"}"#).unwrap();
        assert_eq!(chat.message_offset, 0);
    }

    #[test]
    fn envelope_carries_kind_and_payload() {
        let message = Message::from(ServerStatus {
            server_id: "SMP".into(),
            status: ServerState::Started,
        });
        let envelope = message.to_envelope().unwrap();
        assert_eq!(envelope.type_tag(), "polychat.ServerStatus");
        assert_eq!(Message::from_envelope(&envelope).unwrap(), message);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let envelope = Envelope::new("polychat.Teleport", b"{}".to_vec());
        let err = Message::from_envelope(&envelope).unwrap_err();
        assert!(matches!(err, Error::UnknownKind(tag) if tag == "polychat.Teleport"));
    }

    #[test]
    fn payload_of_wrong_shape_is_a_json_error() {
        let envelope = Envelope::new(MessageKind::ServerInfo.tag(), b"{\"serverId\":1}".to_vec());
        assert!(matches!(
            Message::from_envelope(&envelope),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn outbound_only_kinds() {
        assert!(MessageKind::GenericCommand.is_outbound_only());
        assert!(MessageKind::PromoteMemberCommand.is_outbound_only());
        assert!(!MessageKind::GenericCommandResult.is_outbound_only());
    }

    #[test]
    fn commands_have_no_server_id() {
        let cmd = Message::from(PromoteMemberCommand {
            username: "alice".into(),
            group: "member".into(),
        });
        assert_eq!(cmd.server_id(), None);
        let chat = Message::from(ChatMessage {
            server_id: "SMP".into(),
            message: "hi".into(),
            message_offset: 0,
        });
        assert_eq!(chat.server_id(), Some("SMP"));
    }
}

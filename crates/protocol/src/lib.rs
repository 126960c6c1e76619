//! Polychat wire protocol definitions.
//!
//! Every message travelling between the relay and a game server is wrapped in
//! an [`Envelope`]: a type tag naming the message kind plus the serialized
//! payload bytes. Envelopes are transport-agnostic; the legacy direct-socket
//! transport additionally prefixes each envelope with a 4-byte big-endian
//! length (see [`frame`]).

pub mod envelope;
pub mod error;
pub mod frame;
pub mod messages;

pub use {
    envelope::Envelope,
    error::{Error, Result},
    frame::Framing,
    messages::*,
};

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix shared by every message type tag.
pub const TAG_NAMESPACE: &str = "polychat.";
/// Upper bound for a single framed envelope (1 MiB).
pub const MAX_FRAME_BYTES: usize = 1_048_576;
/// Origin id used for chat that was written in the chat hub.
pub const HUB_ORIGIN_ID: &str = "DISCORD";
/// Origin id used for relay-authored announcements.
pub const RELAY_ORIGIN_ID: &str = "POLYCHAT";

//! Discord chat hub for the polychat relay.
//!
//! Connects to the Discord Gateway through serenity. Relay-channel messages
//! are sanitised into plain game-chat text and broadcast to every server;
//! relay events are posted back into the guild through [`DiscordHub`].

pub mod bridge;
pub mod chunk;
pub mod directory;
pub mod emoji;
pub mod error;
pub mod handler;
pub mod hub;
pub mod sanitize;

pub use {
    bridge::DiscordBridge,
    directory::{GuildDirectory, OfflineDirectory, SerenityDirectory},
    error::{Error, Result},
    hub::DiscordHub,
    sanitize::{MentionContext, MentionedUser, Sanitizer},
};

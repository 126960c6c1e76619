//! Inbound handlers, one per message kind.
//!
//! Per-server lifecycle: `Unregistered → Registered → Removed`. ServerInfo
//! registers, a terminal ServerStatus removes, and the roster handlers only
//! operate on registered servers.

mod chat;
mod command_result;
mod players;
mod server_info;
mod server_status;

pub use {
    chat::ChatMessageHandler,
    command_result::CommandResultHandler,
    players::{PlayerStatusChangedHandler, PlayersOnlineHandler},
    server_info::ServerInfoHandler,
    server_status::ServerStatusHandler,
};

use polychat_protocol::MessageKind;

use crate::Error;

fn unexpected(expected: MessageKind, got: MessageKind) -> Error {
    Error::UnexpectedMessage { expected, got }
}

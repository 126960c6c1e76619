//! Polychat relay core.
//!
//! Keeps a registry of connected game servers, dispatches inbound messages
//! to one handler per message kind, and relays envelopes to servers with
//! best-effort delivery. The transport and the chat hub are collaborators
//! reached through the [`TransportClient`] and [`ChatHub`] traits.

pub mod dispatch;
pub mod error;
pub mod format;
pub mod handlers;
pub mod hub;
pub mod inbound;
pub mod registry;
pub mod server;
pub mod service;
pub mod transport;

pub use {
    dispatch::{Dispatcher, MessageHandler, RelayContext},
    error::{Error, Result},
    hub::{ChatHub, HubError, HubPost, HubTarget},
    inbound::RelayCore,
    registry::ServerRegistry,
    server::{ClientHandle, ServerId, ServerRecord},
    service::RelayService,
    transport::{TransportClient, TransportError},
};

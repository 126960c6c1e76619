use {polychat_protocol::MessageKind, thiserror::Error};

use crate::{ServerId, TransportError};

/// Errors raised while handling a single inbound message.
///
/// Transport failures are logged by the relay service and never reach
/// callers; the variant exists for helpers that address one server directly.
#[derive(Debug, Error)]
pub enum Error {
    #[error("server {server_id} is not registered")]
    NotFound { server_id: ServerId },

    #[error("invalid server id {0:?}")]
    InvalidServerId(String),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] polychat_protocol::Error),

    #[error("no inbound handler for {0}")]
    Unhandled(MessageKind),

    #[error("handler for {expected} received {got}")]
    UnexpectedMessage {
        expected: MessageKind,
        got: MessageKind,
    },
}

impl Error {
    #[must_use]
    pub fn not_found(server_id: &ServerId) -> Self {
        Self::NotFound {
            server_id: server_id.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_server() {
        let err = Error::not_found(&ServerId::normalize("ghost"));
        assert_eq!(err.to_string(), "server GHOST is not registered");
    }

    #[test]
    fn unhandled_names_the_kind() {
        let err = Error::Unhandled(MessageKind::PromoteMemberCommand);
        assert_eq!(
            err.to_string(),
            "no inbound handler for PromoteMemberCommand"
        );
    }
}

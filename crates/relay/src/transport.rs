use {async_trait::async_trait, bytes::Bytes, thiserror::Error};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// One game server's connection, owned by the transport layer.
///
/// Implementations serialize writes so that concurrent `send` calls on the
/// same connection never interleave bytes.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Write one already-framed envelope.
    async fn send(&self, frame: Bytes) -> Result<(), TransportError>;

    /// Stop reading from this connection; the transport closes it.
    async fn stop_listening(&self);

    /// Peer description for log lines.
    fn peer(&self) -> String {
        "unknown peer".into()
    }
}

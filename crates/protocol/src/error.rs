use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The envelope names a message type this build does not know.
    #[error("unknown message type tag: {0}")]
    UnknownKind(String),

    /// Not enough bytes to decode a header or payload.
    #[error("truncated {what}: need {need} bytes, have {have}")]
    Truncated {
        what: &'static str,
        need: usize,
        have: usize,
    },

    #[error("frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("{0} unexpected bytes after frame")]
    TrailingBytes(usize),

    #[error("type tag is not valid utf-8")]
    InvalidTag,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

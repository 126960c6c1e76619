use polychat_relay::HubError;

/// Errors specific to the Discord hub adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("discord config: {0}")]
    Config(String),

    #[error("discord gateway: {0}")]
    Gateway(String),

    #[error("discord send: {0}")]
    Send(String),

    #[error("discord lookup: {0}")]
    Lookup(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for HubError {
    fn from(err: Error) -> Self {
        Self(err.to_string())
    }
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        Self::Gateway(err.to_string())
    }
}

use {async_trait::async_trait, thiserror::Error};

/// Where a hub post goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubTarget {
    /// The configured relay channel.
    Relay,
    /// A specific hub channel id.
    Channel(u64),
}

impl HubTarget {
    /// Parse a channel id sent by a game server, falling back to the relay
    /// channel when it is missing or malformed.
    #[must_use]
    pub fn from_channel_id(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(id) if id != 0 => Self::Channel(id),
            _ => Self::Relay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubPost {
    pub target: HubTarget,
    pub text: String,
    /// Accent colour (`0xRRGGBB`); coloured posts render as embeds.
    pub colour: Option<u32>,
}

impl HubPost {
    pub fn relay(text: impl Into<String>) -> Self {
        Self {
            target: HubTarget::Relay,
            text: text.into(),
            colour: None,
        }
    }
}

#[derive(Debug, Error)]
#[error("chat hub: {0}")]
pub struct HubError(pub String);

/// Posting side of the chat hub. Long texts are split by the implementation.
#[async_trait]
pub trait ChatHub: Send + Sync {
    async fn post(&self, post: HubPost) -> Result<(), HubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_parsing() {
        assert_eq!(HubTarget::from_channel_id("1234"), HubTarget::Channel(1234));
        assert_eq!(HubTarget::from_channel_id(" 99 "), HubTarget::Channel(99));
        assert_eq!(HubTarget::from_channel_id(""), HubTarget::Relay);
        assert_eq!(HubTarget::from_channel_id("0"), HubTarget::Relay);
        assert_eq!(HubTarget::from_channel_id("general"), HubTarget::Relay);
    }
}

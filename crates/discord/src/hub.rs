use std::sync::Arc;

use {
    async_trait::async_trait,
    polychat_relay::{ChatHub, HubError, HubPost, HubTarget},
    serenity::{
        all::{ChannelId, CreateAllowedMentions, CreateEmbed, CreateMessage},
        http::Http,
    },
    tracing::debug,
};

use crate::{
    Error,
    chunk::{MAX_EMBED_DESCRIPTION_LEN, MAX_MESSAGE_LEN, chunk_message},
};

/// Posts relay events into the guild.
///
/// Plain posts are split at the message limit; coloured posts become embeds
/// split at the embed description limit.
pub struct DiscordHub {
    http: Arc<Http>,
    relay_channel: ChannelId,
}

impl DiscordHub {
    pub fn new(http: Arc<Http>, relay_channel: ChannelId) -> Self {
        Self {
            http,
            relay_channel,
        }
    }

    fn channel(&self, target: HubTarget) -> ChannelId {
        match target {
            HubTarget::Relay => self.relay_channel,
            HubTarget::Channel(id) => ChannelId::new(id),
        }
    }
}

/// One Discord message per returned chunk.
#[must_use]
pub fn post_chunks(post: &HubPost) -> Vec<&str> {
    let text = post.text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let limit = if post.colour.is_some() {
        MAX_EMBED_DESCRIPTION_LEN
    } else {
        MAX_MESSAGE_LEN
    };
    chunk_message(text, limit)
}

/// Message for one chunk. Mentions never ping: game text is untrusted.
#[must_use]
pub fn hub_message(chunk: &str, colour: Option<u32>) -> CreateMessage {
    let message = match colour {
        Some(colour) => {
            CreateMessage::new().embed(CreateEmbed::new().description(chunk).colour(colour))
        },
        None => CreateMessage::new().content(chunk),
    };
    message.allowed_mentions(CreateAllowedMentions::new())
}

#[async_trait]
impl ChatHub for DiscordHub {
    async fn post(&self, post: HubPost) -> Result<(), HubError> {
        let chunks = post_chunks(&post);
        if chunks.is_empty() {
            debug!(target = ?post.target, "skipping empty hub post");
            return Ok(());
        }
        let channel_id = self.channel(post.target);
        for chunk in chunks {
            channel_id
                .send_message(&self.http, hub_message(chunk, post.colour))
                .await
                .map_err(|e| Error::Send(format!("channel {channel_id}: {e}")))?;
        }
        debug!(%channel_id, "hub post sent");
        Ok(())
    }
}

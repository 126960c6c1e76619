use std::sync::Arc;

use {
    polychat_config::UnknownMention,
    polychat_protocol::{ChatMessage, HUB_ORIGIN_ID, Message as RelayMessage},
    polychat_relay::{RelayService, format::strip_formatting_codes},
    serenity::{
        all::{ChannelId, Context, EventHandler, GatewayIntents, GuildId, Message, Ready, User},
        async_trait,
    },
    tracing::{debug, info},
};

use crate::{GuildDirectory, MentionContext, MentionedUser, Sanitizer, SerenityDirectory};

/// Required gateway intents for the relay bot.
pub fn required_intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

/// Mirrors relay-channel messages into game chat.
pub struct Handler {
    pub relay: Arc<RelayService>,
    pub relay_channel: ChannelId,
    pub sanitizer: Sanitizer,
    pub unknown_user: UnknownMention,
    /// Guild used to resolve channel and role names; falls back to the
    /// message's own guild when unset.
    pub guild_id: Option<GuildId>,
}

impl Handler {
    #[must_use]
    pub fn directory_guild(&self, message_guild: Option<GuildId>) -> Option<GuildId> {
        self.guild_id.or(message_guild)
    }

    /// Sanitise a relay-channel message and broadcast it to every server.
    /// `None` when nothing is left to relay, else the delivered count.
    pub async fn relay_to_game(
        &self,
        author: &str,
        content: &str,
        users: &[MentionedUser],
        directory: &dyn GuildDirectory,
    ) -> Option<usize> {
        let mention_ctx = MentionContext {
            users,
            directory,
            unknown_user: self.unknown_user,
        };
        let text = self.sanitizer.sanitise(content, &mention_ctx).await;
        let chat = game_chat_message(author, &text)?;
        Some(
            self.relay
                .broadcast_message(&RelayMessage::ChatMessage(chat))
                .await,
        )
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || msg.channel_id != self.relay_channel {
            return;
        }

        let users: Vec<MentionedUser> = msg.mentions.iter().map(mentioned_user).collect();
        let directory =
            SerenityDirectory::new(Arc::clone(&ctx.http), self.directory_guild(msg.guild_id));
        let author = msg
            .member
            .as_ref()
            .and_then(|member| member.nick.clone())
            .or_else(|| msg.author.global_name.clone())
            .unwrap_or_else(|| msg.author.name.clone());

        match self
            .relay_to_game(&author, &msg.content, &users, &directory)
            .await
        {
            Some(delivered) => debug!(
                message_id = msg.id.get(),
                author = %msg.author.name,
                delivered,
                "hub chat relayed to game servers"
            ),
            None => debug!(message_id = msg.id.get(), "nothing to relay after sanitising"),
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            relay_channel = %self.relay_channel,
            "Discord bot connected as {}",
            ready.user.name,
        );
    }
}

fn mentioned_user(user: &User) -> MentionedUser {
    MentionedUser {
        id: user.id.get(),
        name: user.name.clone(),
        discriminator: user.discriminator.map(|d| d.get()),
    }
}

/// Game chat line for a hub message: `[Discord] author: text`, with the
/// offset marking the end of the sender prefix. `None` for blank text.
#[must_use]
pub fn game_chat_message(author: &str, text: &str) -> Option<ChatMessage> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let prefix = format!("[Discord] {}:", strip_formatting_codes(author).trim());
    Some(ChatMessage {
        server_id: HUB_ORIGIN_ID.into(),
        message: format!("{prefix} {text}"),
        message_offset: prefix.len() as u32,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn chat_line_has_prefix_and_offset() {
        let chat = game_chat_message("alice", " hi all ").unwrap();
        assert_eq!(chat.server_id, HUB_ORIGIN_ID);
        assert_eq!(chat.message, "[Discord] alice: hi all");
        assert_eq!(&chat.message[..chat.message_offset as usize], "[Discord] alice:");
    }

    #[test]
    fn author_formatting_codes_are_stripped() {
        let chat = game_chat_message("\u{a7}4evil", "x").unwrap();
        assert_eq!(chat.message, "[Discord] evil: x");
    }

    #[test]
    fn blank_text_is_not_relayed() {
        assert!(game_chat_message("alice", "   ").is_none());
    }

    #[test]
    fn intents_include_message_content() {
        assert!(required_intents().contains(GatewayIntents::MESSAGE_CONTENT));
    }
}

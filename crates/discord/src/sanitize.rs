//! Chat hub text to plain game-chat text.
//!
//! Stages run in a fixed order: user mentions, channel mentions, role
//! mentions, unicode emoji, custom emoji, game formatting codes, zero-width
//! joiners. Each stage only sees text the previous stages already rewrote.

use std::collections::HashMap;

use {
    polychat_config::UnknownMention,
    polychat_relay::format::strip_formatting_codes,
    regex::{Captures, Regex},
    tracing::warn,
};

use crate::{Error, GuildDirectory, Result, emoji};

pub const UNKNOWN_USER: &str = "@unknown_discord_user";
pub const UNKNOWN_CHANNEL: &str = "#deleted-channel";
pub const CHANNEL_LOOKUP_FAILED: &str = "#error-resolving-channel";
pub const UNKNOWN_ROLE: &str = "@deleted-role";
pub const ROLE_LOOKUP_FAILED: &str = "@error-resolving-role";

const ZERO_WIDTH_JOINER: char = '\u{200d}';

/// A user mentioned by the message being sanitised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionedUser {
    pub id: u64,
    pub name: String,
    /// Legacy four-digit tag; `None` for accounts on unique usernames.
    pub discriminator: Option<u16>,
}

impl MentionedUser {
    fn render(&self) -> String {
        match self.discriminator {
            Some(tag) => format!("@{}#{tag:04}", self.name),
            None => format!("@{}", self.name),
        }
    }
}

pub struct MentionContext<'a> {
    pub users: &'a [MentionedUser],
    pub directory: &'a dyn GuildDirectory,
    pub unknown_user: UnknownMention,
}

/// Compiled sanitiser patterns. Build once and share.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    user: Regex,
    channel: Regex,
    role: Regex,
    custom_emoji: Regex,
}

impl Sanitizer {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Config(format!("sanitizer pattern: {e}")))
        };
        Ok(Self {
            user: compile(r"<@!?(\d+)>")?,
            channel: compile(r"<#(\d+)>")?,
            role: compile(r"<@&(\d+)>")?,
            custom_emoji: compile(r"<a?:(\w+):\d+>")?,
        })
    }

    /// Rewrite hub text into text the game client renders verbatim.
    ///
    /// Never fails: directory errors degrade to placeholder text.
    pub async fn sanitise(&self, text: &str, ctx: &MentionContext<'_>) -> String {
        let text = self.replace_users(text, ctx);
        let text = self.replace_channels(&text, ctx.directory).await;
        let text = self.replace_roles(&text, ctx.directory).await;
        let text = emoji::replace_emoji(&text);
        let text = self.custom_emoji.replace_all(&text, ":$1:");
        let text = strip_formatting_codes(&text);
        text.replace(ZERO_WIDTH_JOINER, "")
    }

    fn replace_users(&self, text: &str, ctx: &MentionContext<'_>) -> String {
        self.user
            .replace_all(text, |caps: &Captures<'_>| {
                let user = caps[1]
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| ctx.users.iter().find(|u| u.id == id));
                match (user, ctx.unknown_user) {
                    (Some(user), _) => user.render(),
                    (None, UnknownMention::Placeholder) => UNKNOWN_USER.to_string(),
                    (None, UnknownMention::Echo) => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    async fn replace_channels(&self, text: &str, directory: &dyn GuildDirectory) -> String {
        let mut names = HashMap::new();
        for id in ids(&self.channel, text) {
            let name = match id.parse::<u64>() {
                Ok(raw) => match directory.channel_name(raw).await {
                    Ok(Some(name)) => format!("#{name}"),
                    Ok(None) => UNKNOWN_CHANNEL.to_string(),
                    Err(e) => {
                        warn!(channel_id = raw, "channel mention lookup failed: {e}");
                        CHANNEL_LOOKUP_FAILED.to_string()
                    },
                },
                Err(_) => UNKNOWN_CHANNEL.to_string(),
            };
            names.insert(id, name);
        }
        substitute(&self.channel, text, &names)
    }

    async fn replace_roles(&self, text: &str, directory: &dyn GuildDirectory) -> String {
        let mut names = HashMap::new();
        for id in ids(&self.role, text) {
            let name = match id.parse::<u64>() {
                Ok(raw) => match directory.role_name(raw).await {
                    Ok(Some(name)) => format!("@{name}"),
                    Ok(None) => UNKNOWN_ROLE.to_string(),
                    Err(e) => {
                        warn!(role_id = raw, "role mention lookup failed: {e}");
                        ROLE_LOOKUP_FAILED.to_string()
                    },
                },
                Err(_) => UNKNOWN_ROLE.to_string(),
            };
            names.insert(id, name);
        }
        substitute(&self.role, text, &names)
    }
}

/// Distinct captured ids, in order of first appearance.
fn ids(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in pattern.captures_iter(text) {
        let id = caps[1].to_string();
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

fn substitute(pattern: &Regex, text: &str, names: &HashMap<String, String>) -> String {
    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            names
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::OfflineDirectory;

    struct Guild;

    #[async_trait]
    impl GuildDirectory for Guild {
        async fn channel_name(&self, id: u64) -> Result<Option<String>> {
            match id {
                10 => Ok(Some("general".into())),
                13 => Err(Error::Lookup("rate limited".into())),
                _ => Ok(None),
            }
        }

        async fn role_name(&self, id: u64) -> Result<Option<String>> {
            match id {
                20 => Ok(Some("Moderators".into())),
                23 => Err(Error::Lookup("rate limited".into())),
                _ => Ok(None),
            }
        }
    }

    fn alice() -> MentionedUser {
        MentionedUser {
            id: 123_456_789_012_345_678,
            name: "alice".into(),
            discriminator: Some(1),
        }
    }

    async fn run(text: &str, users: &[MentionedUser], unknown_user: UnknownMention) -> String {
        let ctx = MentionContext {
            users,
            directory: &Guild,
            unknown_user,
        };
        Sanitizer::new().unwrap().sanitise(text, &ctx).await
    }

    #[tokio::test]
    async fn user_mention_resolves() {
        let users = [alice()];
        assert_eq!(
            run("<@123456789012345678>", &users, UnknownMention::Placeholder).await,
            "@alice#0001"
        );
        assert_eq!(
            run("hey <@!123456789012345678>!", &users, UnknownMention::Placeholder).await,
            "hey @alice#0001!"
        );
    }

    #[tokio::test]
    async fn unknown_user_falls_back() {
        assert_eq!(
            run("<@123456789012345678>", &[], UnknownMention::Placeholder).await,
            UNKNOWN_USER
        );
        assert_eq!(
            run("<@123456789012345678>", &[], UnknownMention::Echo).await,
            "<@123456789012345678>"
        );
    }

    #[tokio::test]
    async fn user_without_discriminator() {
        let users = [MentionedUser {
            id: 5,
            name: "bob".into(),
            discriminator: None,
        }];
        assert_eq!(run("<@5>", &users, UnknownMention::Placeholder).await, "@bob");
    }

    #[tokio::test]
    async fn channels_and_roles() {
        assert_eq!(
            run("see <#10> and <#11>", &[], UnknownMention::Placeholder).await,
            "see #general and #deleted-channel"
        );
        assert_eq!(
            run("<#13>", &[], UnknownMention::Placeholder).await,
            CHANNEL_LOOKUP_FAILED
        );
        assert_eq!(
            run("ping <@&20> <@&21> <@&23>", &[], UnknownMention::Placeholder).await,
            "ping @Moderators @deleted-role @error-resolving-role"
        );
    }

    #[tokio::test]
    async fn role_mention_is_not_a_user_mention() {
        assert_eq!(
            run("<@&20>", &[alice()], UnknownMention::Echo).await,
            "@Moderators"
        );
    }

    #[tokio::test]
    async fn emoji_stages() {
        assert_eq!(
            run("nice <:pepega:98765> <a:dance:4321> \u{1f44d}", &[], UnknownMention::Placeholder)
                .await,
            "nice :pepega: :dance: :thumbsup:"
        );
    }

    #[tokio::test]
    async fn formatting_codes_and_joiners_are_removed() {
        assert_eq!(
            run("\u{a7}kobf\u{a7}r a\u{200d}b", &[], UnknownMention::Placeholder).await,
            "obf ab"
        );
    }

    #[tokio::test]
    async fn plain_text_is_unchanged() {
        let ctx = MentionContext {
            users: &[],
            directory: &OfflineDirectory,
            unknown_user: UnknownMention::Placeholder,
        };
        let sanitizer = Sanitizer::new().unwrap();
        for text in ["hello world", "2 < 3 > 1", "email me@example.org", "caf\u{e9}"] {
            assert_eq!(sanitizer.sanitise(text, &ctx).await, text);
        }
    }
}

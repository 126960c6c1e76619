use std::{str::FromStr, time::Duration};

use {
    polychat_protocol::{Framing, MAX_FRAME_BYTES},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use crate::{Error, Result};

/// Root of `polychat.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolychatConfig {
    pub discord: DiscordConfig,
    pub relay: RelayConfig,
    pub broadcast: BroadcastConfig,
    pub restarts: RestartConfig,
}

impl PolychatConfig {
    /// Checks that do not depend on which services get started.
    pub fn validate(&self) -> Result<()> {
        if self.relay.max_frame_bytes == 0 {
            return Err(Error::invalid("relay.max_frame_bytes must be positive"));
        }
        if self.broadcast.interval_secs == 0 {
            return Err(Error::invalid("broadcast.interval_secs must be positive"));
        }
        if self.restarts.check_interval_secs == 0 {
            return Err(Error::invalid(
                "restarts.check_interval_secs must be positive",
            ));
        }
        for entry in &self.restarts.schedules {
            if entry.server_id.trim().is_empty() {
                return Err(Error::invalid("restart schedule with empty server_id"));
            }
            cron::Schedule::from_str(&entry.cron).map_err(|e| {
                Error::invalid(format!(
                    "restart schedule for {} has invalid cron `{}`: {e}",
                    entry.server_id, entry.cron
                ))
            })?;
        }
        Ok(())
    }

    /// Extra checks required before connecting to Discord.
    pub fn validate_discord(&self) -> Result<()> {
        if self.discord.token.expose_secret().trim().is_empty() {
            return Err(Error::invalid("discord.token is required"));
        }
        if self.discord.relay_channel_id == 0 {
            return Err(Error::invalid("discord.relay_channel_id is required"));
        }
        Ok(())
    }
}

/// Fallback for a user mention that cannot be resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMention {
    /// Replace with `@unknown_discord_user`.
    #[default]
    Placeholder,
    /// Keep the raw `<@id>` token.
    Echo,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Guild the bot bridges.
    pub guild_id: u64,

    /// Channel mirrored into game chat; relay notices are posted here.
    pub relay_channel_id: u64,

    pub unknown_user: UnknownMention,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("guild_id", &self.guild_id)
            .field("relay_channel_id", &self.relay_channel_id)
            .field("unknown_user", &self.unknown_user)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            guild_id: 0,
            relay_channel_id: 0,
            unknown_user: UnknownMention::default(),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub framing: Framing,
    pub max_frame_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            framing: Framing::LengthPrefixed,
            max_frame_bytes: MAX_FRAME_BYTES,
        }
    }
}

/// Rotating announcements sent to every server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub interval_secs: u64,
    pub prefix: String,
    pub messages: Vec<String>,
}

impl BroadcastConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            prefix: "[Broadcast]".into(),
            messages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub check_interval_secs: u64,
    /// Only restarts closer than this are announced.
    pub warn_within_secs: u64,
    pub schedules: Vec<RestartScheduleEntry>,
}

impl RestartConfig {
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    #[must_use]
    pub fn warn_within(&self) -> Duration {
        Duration::from_secs(self.warn_within_secs)
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            warn_within_secs: 900,
            schedules: Vec::new(),
        }
    }
}

/// `cron` uses the seconds-first, 6 or 7 field syntax (`0 0 4 * * *`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartScheduleEntry {
    pub server_id: String,
    pub cron: String,
}

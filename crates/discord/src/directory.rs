use std::sync::Arc;

use {
    async_trait::async_trait,
    serenity::{
        all::{Channel, ChannelId, GuildId, RoleId},
        http::{Http, HttpError},
    },
    tracing::debug,
};

use crate::{Error, Result};

/// Name lookups for channel and role mentions.
///
/// `Ok(None)` means the id does not exist; `Err` means the lookup itself
/// failed. The sanitiser renders the two cases differently.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    async fn channel_name(&self, id: u64) -> Result<Option<String>>;

    async fn role_name(&self, id: u64) -> Result<Option<String>>;
}

/// Directory with no entries, for sanitising without a gateway connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineDirectory;

#[async_trait]
impl GuildDirectory for OfflineDirectory {
    async fn channel_name(&self, _id: u64) -> Result<Option<String>> {
        Ok(None)
    }

    async fn role_name(&self, _id: u64) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Directory backed by the Discord REST API.
pub struct SerenityDirectory {
    http: Arc<Http>,
    guild_id: Option<GuildId>,
}

impl SerenityDirectory {
    pub fn new(http: Arc<Http>, guild_id: Option<GuildId>) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl GuildDirectory for SerenityDirectory {
    async fn channel_name(&self, id: u64) -> Result<Option<String>> {
        if id == 0 {
            return Ok(None);
        }
        match ChannelId::new(id).to_channel(&self.http).await {
            Ok(Channel::Guild(channel)) => Ok(Some(channel.name)),
            Ok(_) => Ok(None),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(Error::Lookup(format!("channel {id}: {e}"))),
        }
    }

    async fn role_name(&self, id: u64) -> Result<Option<String>> {
        let Some(guild_id) = self.guild_id else {
            debug!(role_id = id, "role lookup without a guild");
            return Ok(None);
        };
        if id == 0 {
            return Ok(None);
        }
        let roles = guild_id
            .roles(&self.http)
            .await
            .map_err(|e| Error::Lookup(format!("roles of guild {guild_id}: {e}")))?;
        Ok(roles.get(&RoleId::new(id)).map(|role| role.name.clone()))
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use {
    async_trait::async_trait,
    bytes::Bytes,
    polychat_config::UnknownMention,
    polychat_discord::{GuildDirectory, MentionedUser, Result, Sanitizer, handler::Handler},
    polychat_protocol::{Envelope, Framing, HUB_ORIGIN_ID, MAX_FRAME_BYTES, Message},
    polychat_relay::{
        ClientHandle, RelayService, ServerId, ServerRecord, ServerRegistry, TransportClient,
        TransportError,
    },
    serenity::all::{ChannelId, GuildId},
};

#[derive(Default)]
struct Inbox {
    frames: Mutex<Vec<Bytes>>,
}

#[async_trait]
impl TransportClient for Inbox {
    async fn send(&self, frame: Bytes) -> std::result::Result<(), TransportError> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }

    async fn stop_listening(&self) {}
}

struct Guild;

#[async_trait]
impl GuildDirectory for Guild {
    async fn channel_name(&self, id: u64) -> Result<Option<String>> {
        Ok((id == 7).then(|| "events".to_string()))
    }

    async fn role_name(&self, _id: u64) -> Result<Option<String>> {
        Ok(None)
    }
}

fn handler(relay: Arc<RelayService>, guild_id: Option<GuildId>) -> Handler {
    Handler {
        relay,
        relay_channel: ChannelId::new(1),
        sanitizer: Sanitizer::new().unwrap(),
        unknown_user: UnknownMention::Placeholder,
        guild_id,
    }
}

#[tokio::test]
async fn hub_message_reaches_every_server_as_plain_chat() {
    let registry = Arc::new(ServerRegistry::new());
    let inboxes: Vec<Arc<Inbox>> = (0..2).map(|_| Arc::new(Inbox::default())).collect();
    for (id, inbox) in ["smp", "creative"].iter().zip(&inboxes) {
        let client = Arc::clone(inbox) as Arc<dyn TransportClient>;
        let _ = registry.upsert(ServerRecord::new(
            ServerId::normalize(id),
            *id,
            "localhost",
            20,
            ClientHandle::new(&client),
        ));
    }
    let handler = handler(Arc::new(RelayService::new(registry)), None);

    let users = [MentionedUser {
        id: 42,
        name: "alice".into(),
        discriminator: Some(7),
    }];
    let delivered = handler
        .relay_to_game("bob", "<@42> see <#7> \u{1f525}\u{a7}k", &users, &Guild)
        .await;
    assert_eq!(delivered, Some(2));

    for inbox in &inboxes {
        let frames = inbox.frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        let body = Framing::LengthPrefixed
            .decode(&frames[0], MAX_FRAME_BYTES)
            .unwrap();
        let Message::ChatMessage(chat) =
            Message::from_envelope(&Envelope::decode(&body).unwrap()).unwrap()
        else {
            panic!("expected a chat message");
        };
        assert_eq!(chat.server_id, HUB_ORIGIN_ID);
        assert_eq!(chat.message, "[Discord] bob: @alice#0007 see #events :fire:");
    }
}

#[tokio::test]
async fn message_with_nothing_left_is_not_relayed() {
    let handler = handler(Arc::new(RelayService::new(Arc::new(ServerRegistry::new()))), None);
    assert_eq!(handler.relay_to_game("bob", " \u{a7}k ", &[], &Guild).await, None);
}

#[test]
fn configured_guild_wins_over_message_guild() {
    let relay = Arc::new(RelayService::new(Arc::new(ServerRegistry::new())));
    let configured = handler(Arc::clone(&relay), Some(GuildId::new(10)));
    assert_eq!(
        configured.directory_guild(Some(GuildId::new(20))),
        Some(GuildId::new(10))
    );
    let unconfigured = handler(relay, None);
    assert_eq!(
        unconfigured.directory_guild(Some(GuildId::new(20))),
        Some(GuildId::new(20))
    );
}

//! Recording fakes for the transport and chat hub collaborators.
#![allow(dead_code, clippy::unwrap_used)]

use std::{
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use {
    async_trait::async_trait,
    bytes::Bytes,
    polychat_protocol::{Envelope, Framing, MAX_FRAME_BYTES, Message, ServerInfo},
    polychat_relay::{
        ChatHub, HubError, HubPost, RelayCore, RelayService, ServerRegistry, TransportClient,
        TransportError,
    },
    tokio::sync::Notify,
    tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        subscriber::DefaultGuard,
    },
    tracing_subscriber::{
        Layer, Registry,
        layer::{Context, SubscriberExt},
    },
};

/// Transport client that records every frame it is asked to send.
pub struct RecordingClient {
    name: String,
    frames: Mutex<Vec<Bytes>>,
    fail: AtomicBool,
    stopped: AtomicBool,
}

impl RecordingClient {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            frames: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn failing(name: &str) -> Arc<Self> {
        let client = Self::new(name);
        client.fail.store(true, Ordering::SeqCst);
        client
    }

    pub fn as_dyn(self: &Arc<Self>) -> Arc<dyn TransportClient> {
        Arc::clone(self) as Arc<dyn TransportClient>
    }

    /// Frames decoded back into messages (length-prefixed framing).
    pub fn messages(&self) -> Vec<Message> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|frame| {
                let body = Framing::LengthPrefixed
                    .decode(frame, MAX_FRAME_BYTES)
                    .unwrap();
                Message::from_envelope(&Envelope::decode(&body).unwrap()).unwrap()
            })
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportClient for RecordingClient {
    async fn send(&self, frame: Bytes) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Other(format!("{} is unreachable", self.name)));
        }
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }

    async fn stop_listening(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn peer(&self) -> String {
        self.name.clone()
    }
}

/// Transport client whose `send` parks until the test releases it.
pub struct GatedClient {
    inner: Arc<RecordingClient>,
    entered: Notify,
    release: Notify,
}

impl GatedClient {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: RecordingClient::new(name),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }

    pub fn as_dyn(self: &Arc<Self>) -> Arc<dyn TransportClient> {
        Arc::clone(self) as Arc<dyn TransportClient>
    }

    /// Resolves once a `send` is parked on the gate.
    pub async fn wait_until_sending(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.messages()
    }
}

#[async_trait]
impl TransportClient for GatedClient {
    async fn send(&self, frame: Bytes) -> Result<(), TransportError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.send(frame).await
    }

    async fn stop_listening(&self) {
        self.inner.stop_listening().await;
    }

    fn peer(&self) -> String {
        self.inner.peer()
    }
}

/// Collects the message of every WARN or ERROR event on the current thread.
#[derive(Clone, Default)]
pub struct WarningLog(Arc<Mutex<Vec<String>>>);

impl WarningLog {
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(Registry::default().with(self.clone()))
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct MessageField(String);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for WarningLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() <= Level::WARN {
            let mut message = MessageField(String::new());
            event.record(&mut message);
            self.0.lock().unwrap().push(message.0);
        }
    }
}

#[derive(Default)]
pub struct RecordingHub {
    posts: Mutex<Vec<HubPost>>,
}

impl RecordingHub {
    pub fn posts(&self) -> Vec<HubPost> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatHub for RecordingHub {
    async fn post(&self, post: HubPost) -> Result<(), HubError> {
        self.posts.lock().unwrap().push(post);
        Ok(())
    }
}

pub struct Harness {
    pub core: RelayCore,
    pub hub: Arc<RecordingHub>,
}

impl Harness {
    pub fn new() -> Self {
        let registry = Arc::new(ServerRegistry::new());
        let relay = Arc::new(RelayService::new(registry));
        let hub = Arc::new(RecordingHub::default());
        let core = RelayCore::new(relay, Arc::clone(&hub) as Arc<dyn ChatHub>);
        Self { core, hub }
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        self.core.registry()
    }

    pub fn relay(&self) -> &Arc<RelayService> {
        self.core.relay()
    }

    /// Register a server through the ServerInfo handler.
    pub async fn register(&self, id: &str) -> Arc<RecordingClient> {
        let client = RecordingClient::new(id);
        self.core
            .handle(&client.as_dyn(), server_info(id))
            .await
            .unwrap();
        client
    }
}

pub fn server_info(id: &str) -> Message {
    Message::ServerInfo(ServerInfo {
        server_id: id.to_string(),
        server_name: format!("{id} server"),
        server_address: format!("{id}.example.org"),
        max_players: 20,
    })
}

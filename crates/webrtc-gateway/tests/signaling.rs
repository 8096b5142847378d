use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use tokio::time::timeout;
use voicegw_media_core::{AudioFormat, AudioSegment, MediaHandoff, StreamIngester};
use voicegw_registry_client::{ClientError, LocalRegistryClient, SessionRegistryClient};
use voicegw_registry_core::{SessionDetails, SessionRegistry, SessionState, SessionType};
use voicegw_webrtc_gateway::{
    ConnectionInfo, ConnectionOutcome, EngineEvent, MediaEngine, PeerSession, SignalChannel,
    SignalMessage, SignalingHandler, TransportState, WebRtcError,
};

/// Channel whose far end is held by the test
struct MemoryChannel {
    inbound: mpsc::Receiver<SignalMessage>,
    outbound: mpsc::UnboundedSender<SignalMessage>,
    closed: Arc<AtomicUsize>,
}

struct Browser {
    to_gateway: mpsc::Sender<SignalMessage>,
    from_gateway: mpsc::UnboundedReceiver<SignalMessage>,
    channel_closes: Arc<AtomicUsize>,
}

impl Browser {
    async fn send(&self, kind: &str, payload: &str) {
        self.to_gateway
            .send(SignalMessage::new(kind, payload))
            .await
            .unwrap();
    }

    async fn next(&mut self) -> SignalMessage {
        timeout(Duration::from_secs(2), self.from_gateway.recv())
            .await
            .unwrap()
            .unwrap()
    }
}

fn channel_pair() -> (MemoryChannel, Browser) {
    let (to_gateway, inbound) = mpsc::channel(16);
    let (outbound, from_gateway) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicUsize::new(0));
    (
        MemoryChannel {
            inbound,
            outbound,
            closed: closed.clone(),
        },
        Browser {
            to_gateway,
            from_gateway,
            channel_closes: closed,
        },
    )
}

#[async_trait]
impl SignalChannel for MemoryChannel {
    async fn recv(&mut self) -> Option<voicegw_webrtc_gateway::Result<SignalMessage>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn send(&mut self, message: &SignalMessage) -> voicegw_webrtc_gateway::Result<()> {
        self.outbound
            .send(message.clone())
            .map_err(|e| WebRtcError::Channel(e.to_string()))
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Engine whose events are scripted by the test
struct ScriptedEngine {
    events: Mutex<Option<mpsc::Receiver<EngineEvent>>>,
    peer_closes: Arc<AtomicUsize>,
    fail: bool,
}

impl ScriptedEngine {
    fn new() -> (Arc<Self>, mpsc::Sender<EngineEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let engine = Arc::new(Self {
            events: Mutex::new(Some(rx)),
            peer_closes: Arc::new(AtomicUsize::new(0)),
            fail: false,
        });
        (engine, tx)
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(None),
            peer_closes: Arc::new(AtomicUsize::new(0)),
            fail: true,
        })
    }
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn create_session(
        &self,
        _session_id: &str,
    ) -> voicegw_webrtc_gateway::Result<(Box<dyn PeerSession>, mpsc::Receiver<EngineEvent>)> {
        if self.fail {
            return Err(WebRtcError::Engine(
                "Failed to create PeerConnection: no ICE agent".into(),
            ));
        }
        let events = self.events.lock().unwrap().take().unwrap();
        let peer = ScriptedPeer {
            closes: self.peer_closes.clone(),
        };
        Ok((Box::new(peer), events))
    }
}

struct ScriptedPeer {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl PeerSession for ScriptedPeer {
    async fn accept_offer(&self, offer: &str) -> voicegw_webrtc_gateway::Result<String> {
        if offer.is_empty() {
            return Err(WebRtcError::InvalidOffer);
        }
        Ok(format!("answer-to:{}", offer))
    }

    async fn add_remote_candidate(&self, candidate: &str) -> voicegw_webrtc_gateway::Result<()> {
        if candidate.starts_with('{') {
            Ok(())
        } else {
            Err(WebRtcError::InvalidCandidate)
        }
    }

    async fn close(&self) -> voicegw_webrtc_gateway::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Local registry that counts lifecycle calls
struct CountingRegistry {
    inner: LocalRegistryClient,
    registers: AtomicUsize,
    updates: AtomicUsize,
    deregisters: AtomicUsize,
    refuse_register: bool,
}

impl CountingRegistry {
    fn new(registry: Arc<SessionRegistry>) -> Arc<Self> {
        Arc::new(Self {
            inner: LocalRegistryClient::new(registry),
            registers: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deregisters: AtomicUsize::new(0),
            refuse_register: false,
        })
    }

    fn refusing(registry: Arc<SessionRegistry>) -> Arc<Self> {
        Arc::new(Self {
            inner: LocalRegistryClient::new(registry),
            registers: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deregisters: AtomicUsize::new(0),
            refuse_register: true,
        })
    }
}

#[async_trait]
impl SessionRegistryClient for CountingRegistry {
    async fn register_session(
        &self,
        id: &str,
        session_type: SessionType,
        details: SessionDetails,
    ) -> voicegw_registry_client::Result<()> {
        self.registers.fetch_add(1, Ordering::SeqCst);
        if self.refuse_register {
            return Err(ClientError::Unavailable("registry down".into()));
        }
        self.inner.register_session(id, session_type, details).await
    }

    async fn update_session_state(
        &self,
        id: &str,
        state: SessionState,
    ) -> voicegw_registry_client::Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_session_state(id, state).await
    }

    async fn deregister_session(&self, id: &str) -> voicegw_registry_client::Result<()> {
        self.deregisters.fetch_add(1, Ordering::SeqCst);
        self.inner.deregister_session(id).await
    }
}

#[derive(Default)]
struct RecordingIngester {
    segments: Mutex<Vec<AudioSegment>>,
}

#[async_trait]
impl StreamIngester for RecordingIngester {
    async fn ingest(&self, segment: AudioSegment) -> voicegw_media_core::Result<()> {
        self.segments.lock().unwrap().push(segment);
        Ok(())
    }
}

fn browser_info() -> ConnectionInfo {
    ConnectionInfo {
        remote_address: "198.51.100.7:50123".into(),
        user_agent: "TestBrowser/1.0".into(),
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_full_connection_lifecycle() {
    let registry = Arc::new(SessionRegistry::new());
    let client = CountingRegistry::new(registry.clone());
    let (engine, engine_tx) = ScriptedEngine::new();
    let ingester = Arc::new(RecordingIngester::default());
    let handler = Arc::new(SignalingHandler::new(
        client.clone(),
        engine.clone(),
        MediaHandoff::new(ingester.clone()),
    ));

    let (channel, mut browser) = channel_pair();
    let running = tokio::spawn({
        let handler = handler.clone();
        async move { handler.handle_connection(channel, browser_info()).await }
    });

    wait_until(|| registry.len() == 1).await;
    let session = registry.list(None).remove(0);
    assert_eq!(session.session_type, SessionType::WebRtc);
    assert_eq!(session.state, SessionState::Pending);
    assert_eq!(session.details["remote_address"], "198.51.100.7:50123");
    assert_eq!(session.details["user_agent"], "TestBrowser/1.0");

    browser.send("offer", "{\"sdp\":\"x\"}").await;
    assert_eq!(
        browser.next().await,
        SignalMessage::answer("answer-to:{\"sdp\":\"x\"}")
    );

    engine_tx
        .send(EngineEvent::LocalCandidate("{\"candidate\":\"c1\"}".into()))
        .await
        .unwrap();
    assert_eq!(
        browser.next().await,
        SignalMessage::candidate("{\"candidate\":\"c1\"}")
    );

    engine_tx
        .send(EngineEvent::StateChanged(TransportState::Connected))
        .await
        .unwrap();
    engine_tx
        .send(EngineEvent::StateChanged(TransportState::Completed))
        .await
        .unwrap();
    engine_tx
        .send(EngineEvent::StateChanged(TransportState::Connected))
        .await
        .unwrap();
    wait_until(|| registry.get(&session.id).map(|s| s.state) == Ok(SessionState::Active)).await;

    engine_tx
        .send(EngineEvent::AudioFrame(Bytes::from_static(b"opus-0")))
        .await
        .unwrap();
    engine_tx
        .send(EngineEvent::AudioFrame(Bytes::from_static(b"opus-1")))
        .await
        .unwrap();
    engine_tx
        .send(EngineEvent::StateChanged(TransportState::Failed))
        .await
        .unwrap();

    let outcome = timeout(Duration::from_secs(2), running).await.unwrap().unwrap();
    assert_eq!(outcome, ConnectionOutcome::TransportEnded(TransportState::Failed));

    assert_eq!(client.updates.load(Ordering::SeqCst), 1);
    assert_eq!(client.deregisters.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());
    assert_eq!(engine.peer_closes.load(Ordering::SeqCst), 1);
    assert_eq!(browser.channel_closes.load(Ordering::SeqCst), 1);

    wait_until(|| ingester.segments.lock().unwrap().len() == 2).await;
    let mut segments = ingester.segments.lock().unwrap().clone();
    segments.sort_by_key(|s| s.sequence_number);
    assert_eq!(segments[0].sequence_number, 0);
    assert_eq!(segments[1].sequence_number, 1);
    assert!(segments.iter().all(|s| s.format == AudioFormat::Opus));
    assert!(segments.iter().all(|s| s.session_id == session.id));
    assert_eq!(&segments[1].data[..], b"opus-1");
}

#[tokio::test]
async fn test_bad_messages_get_error_replies() {
    let registry = Arc::new(SessionRegistry::new());
    let client = CountingRegistry::new(registry.clone());
    let (engine, _engine_tx) = ScriptedEngine::new();
    let handler = SignalingHandler::new(
        client.clone(),
        engine,
        MediaHandoff::new(Arc::new(RecordingIngester::default())),
    );

    let (channel, mut browser) = channel_pair();
    let running = tokio::spawn(async move { handler.handle_connection(channel, browser_info()).await });

    browser.send("hangup", "").await;
    assert_eq!(browser.next().await, SignalMessage::error("Unknown message type"));

    browser.send("answer", "{}").await;
    assert_eq!(browser.next().await, SignalMessage::error("Unknown message type"));

    browser.send("candidate", "garbage").await;
    assert_eq!(browser.next().await, SignalMessage::error("Invalid ICE candidate"));

    browser.send("offer", "").await;
    assert_eq!(browser.next().await, SignalMessage::error("Invalid offer SDP"));

    // A valid candidate gets no reply; the next message proves the loop is alive
    browser.send("candidate", "{\"candidate\":\"c\"}").await;
    browser.send("offer", "o").await;
    assert_eq!(browser.next().await, SignalMessage::answer("answer-to:o"));

    drop(browser.to_gateway);
    let outcome = timeout(Duration::from_secs(2), running).await.unwrap().unwrap();
    assert_eq!(outcome, ConnectionOutcome::ChannelClosed);
    assert_eq!(client.deregisters.load(Ordering::SeqCst), 1);
    assert_eq!(client.updates.load(Ordering::SeqCst), 0);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_registration_failure_ends_connection() {
    let registry = Arc::new(SessionRegistry::new());
    let client = CountingRegistry::refusing(registry.clone());
    let (engine, _engine_tx) = ScriptedEngine::new();
    let handler = SignalingHandler::new(
        client.clone(),
        engine.clone(),
        MediaHandoff::new(Arc::new(RecordingIngester::default())),
    );

    let (channel, mut browser) = channel_pair();
    let outcome = handler.handle_connection(channel, browser_info()).await;

    assert_eq!(outcome, ConnectionOutcome::RegistrationFailed);
    let reply = browser.next().await;
    assert_eq!(reply.kind, "error");
    assert!(reply.payload.starts_with("Session registration failed"));
    assert_eq!(client.deregisters.load(Ordering::SeqCst), 0);
    assert_eq!(engine.peer_closes.load(Ordering::SeqCst), 1);
    assert_eq!(browser.channel_closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_peer_creation_failure_skips_registration() {
    let registry = Arc::new(SessionRegistry::new());
    let client = CountingRegistry::new(registry.clone());
    let handler = SignalingHandler::new(
        client.clone(),
        ScriptedEngine::failing(),
        MediaHandoff::new(Arc::new(RecordingIngester::default())),
    );

    let (channel, mut browser) = channel_pair();
    let outcome = handler.handle_connection(channel, browser_info()).await;

    assert_eq!(outcome, ConnectionOutcome::PeerCreationFailed);
    assert_eq!(
        browser.next().await,
        SignalMessage::error("Failed to create PeerConnection: no ICE agent")
    );
    assert_eq!(client.registers.load(Ordering::SeqCst), 0);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_aborted_connection_still_deregisters_once() {
    let registry = Arc::new(SessionRegistry::new());
    let client = CountingRegistry::new(registry.clone());
    let (engine, _engine_tx) = ScriptedEngine::new();
    let handler = Arc::new(SignalingHandler::new(
        client.clone(),
        engine,
        MediaHandoff::new(Arc::new(RecordingIngester::default())),
    ));

    let (channel, _browser) = channel_pair();
    let running = tokio::spawn({
        let handler = handler.clone();
        async move { handler.handle_connection(channel, browser_info()).await }
    });

    wait_until(|| registry.len() == 1).await;
    running.abort();
    assert!(running.await.unwrap_err().is_cancelled());

    wait_until(|| registry.is_empty()).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(client.deregisters.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_deregisters_open_connections() {
    let registry = Arc::new(SessionRegistry::new());
    let client = CountingRegistry::new(registry.clone());
    let (engine, _engine_tx) = ScriptedEngine::new();
    let handler = Arc::new(SignalingHandler::new(
        client.clone(),
        engine.clone(),
        MediaHandoff::new(Arc::new(RecordingIngester::default())),
    ));

    let (channel, browser) = channel_pair();
    let running = tokio::spawn({
        let handler = handler.clone();
        async move { handler.handle_connection(channel, browser_info()).await }
    });

    wait_until(|| registry.len() == 1).await;
    assert_eq!(handler.open_connections(), 1);

    timeout(Duration::from_secs(2), handler.shutdown()).await.unwrap();

    assert!(registry.is_empty());
    assert_eq!(client.deregisters.load(Ordering::SeqCst), 1);
    assert_eq!(handler.open_connections(), 0);
    let outcome = timeout(Duration::from_secs(2), running).await.unwrap().unwrap();
    assert_eq!(outcome, ConnectionOutcome::Shutdown);
    assert_eq!(engine.peer_closes.load(Ordering::SeqCst), 1);
    assert_eq!(browser.channel_closes.load(Ordering::SeqCst), 1);

    let (late_channel, late_browser) = channel_pair();
    let outcome = handler.handle_connection(late_channel, browser_info()).await;
    assert_eq!(outcome, ConnectionOutcome::Shutdown);
    assert_eq!(client.registers.load(Ordering::SeqCst), 1);
    assert_eq!(late_browser.channel_closes.load(Ordering::SeqCst), 1);
}

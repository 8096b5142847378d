//! Per-connection signaling lifecycle
//!
//! A connection registers a `WebRTC` session as soon as it opens, marks it
//! active the first time the media transport connects and deregisters it
//! exactly once when the connection ends, whichever side ends it.
//! [`SignalingHandler::shutdown`] ends every open connection the same way and
//! waits for their deregistrations.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use voicegw_media_core::{AudioFormat, AudioSegment, MediaHandoff};
use voicegw_registry_client::SessionRegistryClient;
use voicegw_registry_core::{SessionDetails, SessionState, SessionType};

use crate::channel::SignalChannel;
use crate::engine::{EngineEvent, MediaEngine, PeerSession, TransportState};
use crate::error::WebRtcError;
use crate::guard::RegistrationGuard;
use crate::signal::{SignalKind, SignalMessage, UNKNOWN_TYPE_PAYLOAD};

/// What is known about the browser when its connection opens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub remote_address: String,
    pub user_agent: String,
}

/// Why a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// The engine could not create a peer; nothing was registered
    PeerCreationFailed,
    /// The registry refused the session; nothing to deregister
    RegistrationFailed,
    /// The browser closed the channel
    ChannelClosed,
    /// The media transport reached a terminal state
    TransportEnded(TransportState),
    /// The gateway is shutting down
    Shutdown,
}

/// Shared collaborators of every signaling connection
pub struct SignalingHandler {
    registry: Arc<dyn SessionRegistryClient>,
    engine: Arc<dyn MediaEngine>,
    handoff: MediaHandoff,
    shutdown: CancellationToken,
    connections: TaskTracker,
}

impl SignalingHandler {
    pub fn new(
        registry: Arc<dyn SessionRegistryClient>,
        engine: Arc<dyn MediaEngine>,
        handoff: MediaHandoff,
    ) -> Self {
        Self {
            registry,
            engine,
            handoff,
            shutdown: CancellationToken::new(),
            connections: TaskTracker::new(),
        }
    }

    /// Number of connections currently being driven
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// End every open connection and wait until each has deregistered
    ///
    /// Connections arriving afterwards are closed without registering.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.connections.close();
        info!(open = self.connections.len(), "Closing signaling connections");
        self.connections.wait().await;
        info!("Signaling connections closed");
    }

    /// Drive one connection until it ends
    pub async fn handle_connection<C: SignalChannel>(
        &self,
        channel: C,
        info: ConnectionInfo,
    ) -> ConnectionOutcome {
        self.connections
            .track_future(self.drive_connection(channel, info))
            .await
    }

    async fn drive_connection<C: SignalChannel>(
        &self,
        mut channel: C,
        info: ConnectionInfo,
    ) -> ConnectionOutcome {
        if self.shutdown.is_cancelled() {
            debug!(remote_address = %info.remote_address, "Refusing connection during shutdown");
            channel.close().await;
            return ConnectionOutcome::Shutdown;
        }

        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, remote_address = %info.remote_address, "Signaling connection opened");

        let (peer, events) = match self.engine.create_session(&session_id).await {
            Ok(created) => created,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Failed to create peer");
                send_logged(&mut channel, &session_id, SignalMessage::error(e.to_string())).await;
                channel.close().await;
                return ConnectionOutcome::PeerCreationFailed;
            }
        };

        let details: SessionDetails = HashMap::from([
            ("remote_address".to_string(), info.remote_address),
            ("user_agent".to_string(), info.user_agent),
        ]);
        if let Err(e) = self
            .registry
            .register_session(&session_id, SessionType::WebRtc, details)
            .await
        {
            error!(session_id = %session_id, error = %e, "Session registration failed");
            let reason = WebRtcError::Registration(e).to_string();
            send_logged(&mut channel, &session_id, SignalMessage::error(reason)).await;
            close_peer(peer.as_ref(), &session_id).await;
            channel.close().await;
            return ConnectionOutcome::RegistrationFailed;
        }
        info!(session_id = %session_id, "Session registered");

        let guard = RegistrationGuard::new(self.registry.clone(), session_id.clone());
        let mut connection = Connection {
            session_id: &session_id,
            registry: self.registry.as_ref(),
            handoff: &self.handoff,
            peer: peer.as_ref(),
            shutdown: &self.shutdown,
            active: false,
            next_sequence: 0,
        };
        let outcome = connection.run(&mut channel, events).await;

        close_peer(peer.as_ref(), &session_id).await;
        channel.close().await;
        guard.release().await;
        info!(session_id = %session_id, outcome = ?outcome, "Signaling connection closed");
        outcome
    }
}

impl std::fmt::Debug for SignalingHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingHandler").finish_non_exhaustive()
    }
}

async fn send_logged<C: SignalChannel>(channel: &mut C, session_id: &str, message: SignalMessage) {
    if let Err(e) = channel.send(&message).await {
        warn!(session_id = %session_id, kind = %message.kind, error = %e, "Failed to send signal message");
    }
}

async fn close_peer(peer: &dyn PeerSession, session_id: &str) {
    if let Err(e) = peer.close().await {
        warn!(session_id = %session_id, error = %e, "Failed to close peer");
    }
}

/// State of one registered connection
struct Connection<'a> {
    session_id: &'a str,
    registry: &'a dyn SessionRegistryClient,
    handoff: &'a MediaHandoff,
    peer: &'a dyn PeerSession,
    shutdown: &'a CancellationToken,
    /// Set once the active transition has been requested
    active: bool,
    next_sequence: u32,
}

impl Connection<'_> {
    async fn run<C: SignalChannel>(
        &mut self,
        channel: &mut C,
        mut events: mpsc::Receiver<EngineEvent>,
    ) -> ConnectionOutcome {
        let shutdown = self.shutdown;
        let mut engine_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(session_id = %self.session_id, "Closing connection for shutdown");
                    return ConnectionOutcome::Shutdown;
                }
                incoming = channel.recv() => match incoming {
                    None => return ConnectionOutcome::ChannelClosed,
                    Some(Err(e)) => {
                        warn!(session_id = %self.session_id, error = %e, "Discarding undecodable signal");
                        send_logged(channel, self.session_id, SignalMessage::error(e.to_string())).await;
                    }
                    Some(Ok(message)) => {
                        if let Some(reply) = self.on_signal(message).await {
                            send_logged(channel, self.session_id, reply).await;
                        }
                    }
                },
                event = events.recv(), if engine_open => match event {
                    None => {
                        debug!(session_id = %self.session_id, "Engine event stream ended");
                        engine_open = false;
                    }
                    Some(EngineEvent::LocalCandidate(candidate)) => {
                        send_logged(channel, self.session_id, SignalMessage::candidate(candidate)).await;
                    }
                    Some(EngineEvent::StateChanged(state)) => {
                        if let Some(outcome) = self.on_transport_state(state).await {
                            return outcome;
                        }
                    }
                    Some(EngineEvent::AudioFrame(data)) => self.on_audio(data),
                },
            }
        }
    }

    async fn on_signal(&mut self, message: SignalMessage) -> Option<SignalMessage> {
        debug!(session_id = %self.session_id, kind = %message.kind, "Received signal message");

        match message.kind() {
            SignalKind::Offer => match self.peer.accept_offer(&message.payload).await {
                Ok(answer) => {
                    info!(session_id = %self.session_id, "Sending SDP answer");
                    Some(SignalMessage::answer(answer))
                }
                Err(e) => {
                    warn!(session_id = %self.session_id, error = %e, "Offer rejected");
                    Some(SignalMessage::error(e.to_string()))
                }
            },
            SignalKind::Candidate => match self.peer.add_remote_candidate(&message.payload).await {
                Ok(()) => None,
                Err(e) => {
                    warn!(session_id = %self.session_id, error = %e, "Candidate rejected");
                    Some(SignalMessage::error(e.to_string()))
                }
            },
            SignalKind::Answer | SignalKind::Error | SignalKind::Unknown => {
                warn!(session_id = %self.session_id, kind = %message.kind, "Unexpected signal message type");
                Some(SignalMessage::error(UNKNOWN_TYPE_PAYLOAD))
            }
        }
    }

    async fn on_transport_state(&mut self, state: TransportState) -> Option<ConnectionOutcome> {
        info!(session_id = %self.session_id, state = ?state, "Transport state changed");

        if state.is_connected() && !self.active {
            self.active = true;
            match self
                .registry
                .update_session_state(self.session_id, SessionState::Active)
                .await
            {
                Ok(()) => info!(session_id = %self.session_id, "Session active"),
                Err(e) => warn!(session_id = %self.session_id, error = %e, "Failed to mark session active"),
            }
        }

        state
            .is_terminal()
            .then_some(ConnectionOutcome::TransportEnded(state))
    }

    fn on_audio(&mut self, data: bytes::Bytes) {
        let segment = AudioSegment::new(self.session_id, AudioFormat::Opus, self.next_sequence, data);
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.handoff.submit(segment);
    }
}

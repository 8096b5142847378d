//! Boundary between signaling and the embedded media engine
//!
//! The connection handler only needs to hand over remote descriptions and
//! candidates and to observe what the engine reports back. Everything below
//! that line (ICE, DTLS, SRTP, codecs) belongs to the engine.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::Result;

/// Transport state as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    pub fn is_connected(&self) -> bool {
        matches!(self, TransportState::Connected | TransportState::Completed)
    }

    /// States after which the connection is torn down
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransportState::Disconnected | TransportState::Failed | TransportState::Closed
        )
    }
}

/// Something the engine observed on a peer
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Locally gathered candidate, JSON encoded
    LocalCandidate(String),
    StateChanged(TransportState),
    /// Payload of one inbound audio packet, still encoded
    AudioFrame(Bytes),
}

/// Creates one peer per signaling connection
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Create a peer and the stream of events it will report
    async fn create_session(
        &self,
        session_id: &str,
    ) -> Result<(Box<dyn PeerSession>, mpsc::Receiver<EngineEvent>)>;
}

/// One peer connection inside the engine
#[async_trait]
pub trait PeerSession: Send + Sync {
    /// Apply a JSON encoded remote offer and return the JSON encoded answer
    ///
    /// Resolves once local candidate gathering has completed.
    async fn accept_offer(&self, offer: &str) -> Result<String>;

    /// Add a JSON encoded remote candidate
    async fn add_remote_candidate(&self, candidate: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

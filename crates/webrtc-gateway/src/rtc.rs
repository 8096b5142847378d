//! [`MediaEngine`] backed by the `webrtc` crate

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

use crate::config::WebRtcConfig;
use crate::engine::{EngineEvent, MediaEngine, PeerSession, TransportState};
use crate::error::{Result, WebRtcError};

const EVENT_CHANNEL_CAPACITY: usize = 256;

impl From<RTCIceConnectionState> for TransportState {
    fn from(state: RTCIceConnectionState) -> Self {
        match state {
            RTCIceConnectionState::Checking => TransportState::Checking,
            RTCIceConnectionState::Connected => TransportState::Connected,
            RTCIceConnectionState::Completed => TransportState::Completed,
            RTCIceConnectionState::Disconnected => TransportState::Disconnected,
            RTCIceConnectionState::Failed => TransportState::Failed,
            RTCIceConnectionState::Closed => TransportState::Closed,
            _ => TransportState::New,
        }
    }
}

/// Production media engine
pub struct RtcMediaEngine {
    api: API,
    rtc_config: RTCConfiguration,
}

impl RtcMediaEngine {
    pub fn new(config: &WebRtcConfig) -> Result<Self> {
        let mut codecs = webrtc::api::media_engine::MediaEngine::default();
        codecs
            .register_default_codecs()
            .map_err(|e| WebRtcError::engine("Failed to register codecs", e))?;

        let registry = register_default_interceptors(Registry::new(), &mut codecs)
            .map_err(|e| WebRtcError::engine("Failed to register interceptors", e))?;

        let api = APIBuilder::new()
            .with_media_engine(codecs)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self {
            api,
            rtc_config: rtc_configuration(config),
        })
    }
}

fn rtc_configuration(config: &WebRtcConfig) -> RTCConfiguration {
    let mut ice_servers = Vec::new();
    if !config.stun_servers.is_empty() {
        ice_servers.push(RTCIceServer {
            urls: config.stun_servers.clone(),
            ..Default::default()
        });
    }
    if !config.turn_servers.is_empty() {
        ice_servers.push(RTCIceServer {
            urls: config.turn_servers.clone(),
            username: config.turn_username.clone().unwrap_or_default(),
            credential: config.turn_credential.clone().unwrap_or_default(),
            ..Default::default()
        });
    }

    RTCConfiguration {
        ice_servers,
        ..Default::default()
    }
}

#[async_trait]
impl MediaEngine for RtcMediaEngine {
    async fn create_session(
        &self,
        session_id: &str,
    ) -> Result<(Box<dyn PeerSession>, mpsc::Receiver<EngineEvent>)> {
        let pc = Arc::new(
            self.api
                .new_peer_connection(self.rtc_config.clone())
                .await
                .map_err(|e| WebRtcError::engine("Failed to create PeerConnection", e))?,
        );
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let tx = events_tx.clone();
        let id = session_id.to_string();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = tx.clone();
            let id = id.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else {
                    debug!(session_id = %id, "ICE gathering complete");
                    return;
                };
                let json = candidate
                    .to_json()
                    .map_err(|e| e.to_string())
                    .and_then(|init| serde_json::to_string(&init).map_err(|e| e.to_string()));
                match json {
                    Ok(json) => {
                        let _ = tx.send(EngineEvent::LocalCandidate(json)).await;
                    }
                    Err(e) => warn!(session_id = %id, error = %e, "Failed to encode ICE candidate"),
                }
            })
        }));

        let tx = events_tx.clone();
        let id = session_id.to_string();
        pc.on_ice_connection_state_change(Box::new(move |state: RTCIceConnectionState| {
            let tx = tx.clone();
            info!(session_id = %id, state = %state, "ICE connection state changed");
            Box::pin(async move {
                let _ = tx.send(EngineEvent::StateChanged(state.into())).await;
            })
        }));

        let tx = events_tx;
        let id = session_id.to_string();
        pc.on_track(Box::new(
            move |track: Arc<TrackRemote>, _: Arc<RTCRtpReceiver>, _: Arc<RTCRtpTransceiver>| {
                let tx = tx.clone();
                let id = id.clone();
                Box::pin(async move {
                    if track.kind() != RTPCodecType::Audio {
                        return;
                    }
                    info!(session_id = %id, ssrc = track.ssrc(), "Receiving remote audio track");
                    tokio::spawn(async move {
                        loop {
                            match track.read_rtp().await {
                                Ok((packet, _)) => {
                                    if tx.send(EngineEvent::AudioFrame(packet.payload)).await.is_err() {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    debug!(session_id = %id, error = %e, "Remote audio track ended");
                                    break;
                                }
                            }
                        }
                    });
                })
            },
        ));

        Ok((Box::new(RtcPeerSession { pc }), events_rx))
    }
}

struct RtcPeerSession {
    pc: Arc<RTCPeerConnection>,
}

#[async_trait]
impl PeerSession for RtcPeerSession {
    async fn accept_offer(&self, offer: &str) -> Result<String> {
        let offer: RTCSessionDescription =
            serde_json::from_str(offer).map_err(|_| WebRtcError::InvalidOffer)?;

        self.pc
            .set_remote_description(offer)
            .await
            .map_err(|e| WebRtcError::engine("Failed to set remote description", e))?;
        let answer = self
            .pc
            .create_answer(None)
            .await
            .map_err(|e| WebRtcError::engine("Failed to create answer", e))?;

        let mut gather_complete = self.pc.gathering_complete_promise().await;
        self.pc
            .set_local_description(answer)
            .await
            .map_err(|e| WebRtcError::engine("Failed to set local description", e))?;
        let _ = gather_complete.recv().await;

        let local = self
            .pc
            .local_description()
            .await
            .ok_or_else(|| WebRtcError::Engine("Failed to marshal answer".to_string()))?;
        serde_json::to_string(&local).map_err(|e| WebRtcError::engine("Failed to marshal answer", e))
    }

    async fn add_remote_candidate(&self, candidate: &str) -> Result<()> {
        let candidate: RTCIceCandidateInit =
            serde_json::from_str(candidate).map_err(|_| WebRtcError::InvalidCandidate)?;
        self.pc
            .add_ice_candidate(candidate)
            .await
            .map_err(|e| WebRtcError::engine("Failed to add ICE candidate", e))
    }

    async fn close(&self) -> Result<()> {
        self.pc
            .close()
            .await
            .map_err(|e| WebRtcError::engine("Failed to close PeerConnection", e))
    }
}

//! Per-datagram SIP request handling
//!
//! The engine keeps no dialog state of its own: each request is correlated by
//! its `Call-ID` and the session registry is the only record of a call.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};
use voicegw_media_core::{MediaHandoff, MediaTaskManager, simulate_call_audio};
use voicegw_registry_client::{SessionRegistryClient, SessionRegistryClientExt};
use voicegw_registry_core::{SessionDetails, SessionState, SessionType};

use crate::builder::generate_response;
use crate::config::SipConfig;
use crate::error::Result;
use crate::message::{HEADER_CONTACT, HEADER_FROM, HEADER_TO, Method, SignalingRequest};
use crate::parser::parse_signaling_request;

pub const REGISTRATION_FAILED_REASON: &str = "Server Internal Error - Session Registration Failed";

/// Outbound half of a datagram transport
#[async_trait]
pub trait DatagramSender: Send + Sync {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()>;
}

/// Placeholder audio emitted for an answered call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaSimulation {
    pub frames: u32,
    pub interval: Duration,
}

/// Timing and addressing used when answering calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Host written into Contact and the SDP connection line
    pub advertised_host: String,
    pub advertised_port: u16,
    pub ring_delay: Duration,
    pub answer_delay: Duration,
    pub media: Option<MediaSimulation>,
}

impl EngineSettings {
    pub fn from_config(config: &SipConfig, local_addr: SocketAddr) -> Self {
        Self {
            advertised_host: config
                .contact_host
                .clone()
                .unwrap_or_else(|| advertised_host(local_addr)),
            advertised_port: config.contact_port.unwrap_or(local_addr.port()),
            ring_delay: config.ring_delay(),
            answer_delay: config.answer_delay(),
            media: config.simulate_media.then(|| MediaSimulation {
                frames: config.media_frames,
                interval: config.media_frame_interval(),
            }),
        }
    }

    /// No pauses and no simulated audio
    pub fn immediate(local_addr: SocketAddr) -> Self {
        Self {
            advertised_host: advertised_host(local_addr),
            advertised_port: local_addr.port(),
            ring_delay: Duration::ZERO,
            answer_delay: Duration::ZERO,
            media: None,
        }
    }
}

fn advertised_host(local_addr: SocketAddr) -> String {
    if local_addr.ip().is_unspecified() {
        "127.0.0.1".to_string()
    } else {
        local_addr.ip().to_string()
    }
}

/// Keep-alives: too short to hold a request line, or only line breaks and NULs
fn is_keep_alive(data: &[u8]) -> bool {
    data.len() < 4 || data.iter().all(|b| matches!(b, b'\r' | b'\n' | 0))
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// SIP request handler shared by every inbound datagram
pub struct SipEngine {
    registry: Arc<dyn SessionRegistryClient>,
    sender: Arc<dyn DatagramSender>,
    handoff: MediaHandoff,
    media_tasks: Arc<MediaTaskManager>,
    settings: EngineSettings,
}

impl SipEngine {
    pub fn new(
        registry: Arc<dyn SessionRegistryClient>,
        sender: Arc<dyn DatagramSender>,
        handoff: MediaHandoff,
        media_tasks: Arc<MediaTaskManager>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            sender,
            handoff,
            media_tasks,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Process one inbound datagram; responses go back to `source`
    ///
    /// Nothing is returned: unparseable input is dropped and registry
    /// failures are answered or logged here.
    pub async fn handle_datagram(&self, data: &[u8], source: SocketAddr) {
        if is_keep_alive(data) {
            trace!(%source, len = data.len(), "Ignoring keep-alive");
            return;
        }

        let request = match parse_signaling_request(data).await {
            Ok(request) => request,
            Err(e) => {
                warn!(%source, error = %e, "Dropping unparseable SIP datagram");
                return;
            }
        };

        let Some(call_id) = request.call_id().map(str::to_string) else {
            warn!(%source, method = %request.method, "Dropping request without Call-ID");
            return;
        };

        info!(method = %request.method, call_id = %call_id, %source, "Received SIP request");

        match request.method {
            Method::Invite => self.handle_invite(&request, &call_id, source).await,
            Method::Ack => debug!(call_id = %call_id, "ACK received, call confirmed"),
            Method::Bye => self.handle_bye(&request, &call_id, source).await,
            ref other => info!(method = %other, call_id = %call_id, "Unhandled SIP method"),
        }
    }

    async fn handle_invite(&self, request: &SignalingRequest, call_id: &str, source: SocketAddr) {
        self.respond(100, "Trying", request, &[], source).await;

        let details: SessionDetails = HashMap::from([
            ("from".to_string(), request.header(HEADER_FROM).unwrap_or_default().to_string()),
            ("to".to_string(), request.header(HEADER_TO).unwrap_or_default().to_string()),
            ("remote_address".to_string(), source.to_string()),
        ]);

        if let Err(e) = self
            .registry
            .register_session(call_id, SessionType::Sip, details)
            .await
        {
            error!(call_id = %call_id, error = %e, "Session registration failed");
            self.respond(500, REGISTRATION_FAILED_REASON, request, &[], source)
                .await;
            return;
        }

        pause(self.settings.ring_delay).await;
        self.respond(180, "Ringing", request, &[], source).await;
        pause(self.settings.answer_delay).await;

        if let Some(media) = self.settings.media {
            self.media_tasks.spawn(
                call_id,
                simulate_call_audio(
                    self.handoff.clone(),
                    call_id.to_string(),
                    media.frames,
                    media.interval,
                ),
            );
        }

        if let Err(e) = self
            .registry
            .update_session_state(call_id, SessionState::Active)
            .await
        {
            warn!(call_id = %call_id, error = %e, "Failed to mark session active");
        }

        let contact = format!(
            "<sip:{}:{}>",
            self.settings.advertised_host, self.settings.advertised_port
        );
        self.respond(200, "OK", request, &[(HEADER_CONTACT, contact)], source)
            .await;
        info!(call_id = %call_id, "Call established");
    }

    async fn handle_bye(&self, request: &SignalingRequest, call_id: &str, source: SocketAddr) {
        self.media_tasks.cancel(call_id);

        if let Err(e) = self.registry.release_session(call_id).await {
            warn!(call_id = %call_id, error = %e, "Failed to deregister session");
        }

        self.respond(200, "OK", request, &[], source).await;
        info!(call_id = %call_id, "Call ended");
    }

    async fn respond(
        &self,
        status: u16,
        reason: &str,
        request: &SignalingRequest,
        extra_headers: &[(&str, String)],
        destination: SocketAddr,
    ) {
        let response = generate_response(
            status,
            reason,
            request,
            extra_headers,
            &self.settings.advertised_host,
        );
        debug!(status, %destination, "Sending SIP response");
        if let Err(e) = self.sender.send_to(response.as_bytes(), destination).await {
            warn!(status, %destination, error = %e, "Failed to send SIP response");
        }
    }
}

impl std::fmt::Debug for SipEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SipEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

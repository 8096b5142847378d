use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use voicegw_media_core::{MediaHandoff, MediaTaskManager};
use voicegw_registry_client::SessionRegistryClient;

use crate::config::SipConfig;
use crate::engine::{EngineSettings, SipEngine};
use crate::error::{Error, Result};
use crate::transport::{TransportEvent, UdpTransport};

/// SIP front-end: a UDP transport feeding a [`SipEngine`]
pub struct SipGateway {
    transport: UdpTransport,
    events: mpsc::Receiver<TransportEvent>,
    engine: Arc<SipEngine>,
    local_addr: SocketAddr,
}

impl SipGateway {
    pub async fn bind(
        config: &SipConfig,
        registry: Arc<dyn SessionRegistryClient>,
        handoff: MediaHandoff,
        media_tasks: Arc<MediaTaskManager>,
    ) -> Result<Self> {
        if config.simulate_media && config.media_frame_interval_ms == 0 {
            return Err(Error::Configuration(
                "media_frame_interval_ms must be greater than zero".to_string(),
            ));
        }

        let (transport, events) = UdpTransport::bind(
            config.listen_addr,
            config.recv_buffer_size,
            Some(config.channel_capacity),
        )
        .await?;
        let local_addr = transport.local_addr()?;

        let settings = EngineSettings::from_config(config, local_addr);
        let engine = Arc::new(SipEngine::new(
            registry,
            Arc::new(transport.clone()),
            handoff,
            media_tasks,
            settings,
        ));

        Ok(Self {
            transport,
            events,
            engine,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn engine(&self) -> Arc<SipEngine> {
        self.engine.clone()
    }

    /// Handle datagrams one at a time until `shutdown` fires
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(addr = %self.local_addr, "SIP gateway running");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("SIP gateway shutting down");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(TransportEvent::DatagramReceived { data, source, .. }) => {
                        self.engine.handle_datagram(&data, source).await;
                    }
                    Some(TransportEvent::Error { error }) => {
                        warn!(error = %error, "SIP transport error");
                    }
                    Some(TransportEvent::Closed) | None => {
                        info!("SIP transport closed");
                        break;
                    }
                },
            }
        }

        self.transport.close();
    }
}

impl std::fmt::Debug for SipGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SipGateway")
            .field("local_addr", &self.local_addr)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

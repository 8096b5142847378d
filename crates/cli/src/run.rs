//! Process wiring for each subcommand

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use voicegw_media_core::{MediaHandoff, MediaTaskManager};
use voicegw_registry_client::{HttpRegistryClient, LocalRegistryClient, SessionRegistryClient};
use voicegw_registry_core::{SessionRegistry, api};
use voicegw_sip_gateway::SipGateway;
use voicegw_webrtc_gateway::{RtcMediaEngine, SignalingHandler};

use crate::Command;
use crate::config::GatewayConfig;

/// Upper bound on waiting for WebRTC sessions to deregister at shutdown
const CONNECTION_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run(command: Command, config: GatewayConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    watch_ctrl_c(shutdown.clone());

    match command {
        Command::Registry => {
            let registry = Arc::new(SessionRegistry::new());
            serve_registry(&config, registry, shutdown).await
        }
        Command::Gateway => {
            let client = HttpRegistryClient::new(&config.registry.client)
                .context("invalid registry client configuration")?;
            info!(endpoint = %config.registry.client.endpoint, "Using remote session registry");
            run_gateways(&config, Arc::new(client), shutdown).await
        }
        Command::All => {
            let registry = Arc::new(SessionRegistry::new());
            let api_task = {
                let config = config.clone();
                let registry = registry.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    let result = serve_registry(&config, registry, shutdown.clone()).await;
                    if result.is_err() {
                        shutdown.cancel();
                    }
                    result
                })
            };

            let client = Arc::new(LocalRegistryClient::new(registry));
            let gateways = run_gateways(&config, client, shutdown.clone()).await;
            shutdown.cancel();
            let api = api_task.await.context("registry API task failed")?;
            gateways.and(api)
        }
        Command::PrintConfig => Ok(()),
    }
}

fn watch_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                shutdown.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}

async fn serve_registry(
    config: &GatewayConfig,
    registry: Arc<SessionRegistry>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = &config.registry.api.listen_addr;
    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind registry API to {}", addr))?;
    api::serve(listener, registry, async move { shutdown.cancelled().await }).await?;
    Ok(())
}

async fn run_gateways(
    config: &GatewayConfig,
    registry: Arc<dyn SessionRegistryClient>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let handoff = MediaHandoff::new(config.media.build_ingester()?);
    let media_tasks = Arc::new(MediaTaskManager::new());

    let sip = SipGateway::bind(&config.sip, registry.clone(), handoff.clone(), media_tasks.clone())
        .await
        .with_context(|| format!("failed to bind SIP transport to {}", config.sip.listen_addr))?;

    let engine = Arc::new(RtcMediaEngine::new(&config.webrtc)?);
    let handler = Arc::new(SignalingHandler::new(registry, engine, handoff));
    let listener = TcpListener::bind(config.webrtc.listen_addr)
        .await
        .with_context(|| format!("failed to bind WebRTC signaling to {}", config.webrtc.listen_addr))?;

    let sip_task = tokio::spawn(sip.run(shutdown.clone()));
    let webrtc_task = {
        let handler = handler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let stop = shutdown.clone();
            let result =
                voicegw_webrtc_gateway::serve(listener, handler, async move { stop.cancelled().await })
                    .await;
            if result.is_err() {
                shutdown.cancel();
            }
            result
        })
    };

    let (sip_result, webrtc_result) = tokio::join!(sip_task, webrtc_task);
    if timeout(CONNECTION_DRAIN_TIMEOUT, handler.shutdown()).await.is_err() {
        warn!(
            open = handler.open_connections(),
            "Signaling connections still open after {:?}", CONNECTION_DRAIN_TIMEOUT
        );
    }
    media_tasks.shutdown().await;
    info!("Gateways stopped");

    sip_result.context("SIP gateway task failed")?;
    webrtc_result
        .context("WebRTC signaling task failed")?
        .context("WebRTC signaling server failed")?;
    Ok(())
}

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{ConnectInfo, State, WebSocketUpgrade},
    http::{HeaderMap, header::USER_AGENT},
    response::Response,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::channel::WebSocketChannel;
use crate::handler::{ConnectionInfo, SignalingHandler};

/// Router exposing the `GET /ws` signaling endpoint
pub fn router(handler: Arc<SignalingHandler>) -> Router {
    Router::new()
        .route("/ws", get(upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn upgrade(
    ws: WebSocketUpgrade,
    State(handler): State<Arc<SignalingHandler>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let info = ConnectionInfo {
        remote_address: remote.to_string(),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    };

    ws.on_upgrade(move |socket| async move {
        handler
            .handle_connection(WebSocketChannel::new(socket), info)
            .await;
    })
}

/// Serve signaling on `listener` until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    handler: Arc<SignalingHandler>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("WebRTC signaling listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        router(handler).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    info!("WebRTC signaling stopped");
    Ok(())
}

//! HTTP API over the session registry
//!
//! | Route                          | Success | Errors        |
//! |--------------------------------|---------|---------------|
//! | `POST /sessions`               | 201     | 400, 409      |
//! | `GET /sessions[?type=]`        | 200     | 400           |
//! | `GET /sessions/{id}`           | 200     | 404           |
//! | `PUT /sessions/{id}/state`     | 200     | 400, 404      |
//! | `PUT /sessions/{id}/details`   | 200     | 400, 404      |
//! | `DELETE /sessions/{id}`        | 204     | 404           |
//! | `GET /health`                  | 200     |               |

mod handlers;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::registry::SessionRegistry;

/// Build the registry router
pub fn router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route(
            "/sessions",
            post(handlers::create_session).get(handlers::list_sessions),
        )
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/state", put(handlers::update_state))
        .route("/sessions/{id}/details", put(handlers::update_details))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, registry: Arc<SessionRegistry>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Session registry API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Session registry API stopped");
    Ok(())
}

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use super::types::{
    CreateSessionRequest, ErrorBody, HealthResponse, ListQuery, UpdateDetailsRequest,
    UpdateStateRequest,
};
use crate::error::RegistryError;
use crate::registry::SessionRegistry;
use crate::types::Session;

type ApiResult<T> = std::result::Result<T, RegistryError>;

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match &self {
            RegistryError::DuplicateSession(_) => StatusCode::CONFLICT,
            RegistryError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RegistryError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        debug!(%status, error = %self, "Registry request rejected");
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

pub(super) async fn create_session(
    State(registry): State<Arc<SessionRegistry>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let Json(req) = payload.map_err(|e| RegistryError::invalid(e.body_text()))?;
    if req.id.trim().is_empty() {
        return Err(RegistryError::invalid("session id is required"));
    }

    let session = registry.create(req.id, req.session_type, req.details.unwrap_or_default())?;
    info!(session_id = %session.id, session_type = %session.session_type, "Session registered");
    Ok((StatusCode::CREATED, Json(session)))
}

pub(super) async fn list_sessions(
    State(registry): State<Arc<SessionRegistry>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Session>>> {
    let Query(query) = query.map_err(|e| RegistryError::invalid(e.body_text()))?;
    Ok(Json(registry.list(query.session_type)))
}

pub(super) async fn get_session(
    State(registry): State<Arc<SessionRegistry>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Session>> {
    Ok(Json(registry.get(&id)?))
}

pub(super) async fn update_state(
    State(registry): State<Arc<SessionRegistry>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStateRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(req) = payload.map_err(|e| RegistryError::invalid(e.body_text()))?;
    let session = registry.update_state(&id, req.state)?;
    info!(session_id = %id, state = %session.state, "Session state changed");
    Ok(Json(session))
}

pub(super) async fn update_details(
    State(registry): State<Arc<SessionRegistry>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDetailsRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(req) = payload.map_err(|e| RegistryError::invalid(e.body_text()))?;
    let details = req
        .details
        .ok_or_else(|| RegistryError::invalid("details must be an object"))?;
    Ok(Json(registry.update_details(&id, details)?))
}

pub(super) async fn delete_session(
    State(registry): State<Arc<SessionRegistry>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    registry.delete(&id)?;
    info!(session_id = %id, "Session deregistered");
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn health(State(registry): State<Arc<SessionRegistry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: registry.len(),
    })
}

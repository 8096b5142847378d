//! Request and response bodies of the registry HTTP API

use serde::{Deserialize, Serialize};

use crate::types::{SessionDetails, SessionState, SessionType};

/// `POST /sessions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<SessionDetails>,
}

/// `PUT /sessions/{id}/state`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStateRequest {
    pub state: SessionState,
}

/// `PUT /sessions/{id}/details`
///
/// `details` is optional on the wire so that an explicit `null` can be
/// told apart from an empty map and rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDetailsRequest {
    #[serde(default)]
    pub details: Option<SessionDetails>,
}

/// `GET /sessions?type=...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub session_type: Option<SessionType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
}

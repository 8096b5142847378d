//! Session records and their enumerations

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Free-form call metadata: caller/callee, remote address, user agent...
pub type SessionDetails = HashMap<String, String>;

/// Protocol that originated a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "SIP")]
    Sip,
    #[serde(rename = "WebRTC")]
    WebRtc,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Sip => "SIP",
            SessionType::WebRtc => "WebRTC",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIP" => Ok(SessionType::Sip),
            "WebRTC" => Ok(SessionType::WebRtc),
            other => Err(RegistryError::invalid(format!("unknown session type '{}'", other))),
        }
    }
}

/// Lifecycle state of a session
///
/// Any state may follow any other; ending a call removes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Pending,
    Active,
    Terminated,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Pending => "pending",
            SessionState::Active => "active",
            SessionState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionState::Pending),
            "active" => Ok(SessionState::Active),
            "terminated" => Ok(SessionState::Terminated),
            other => Err(RegistryError::invalid(format!("unknown session state '{}'", other))),
        }
    }
}

/// One call as known to the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: SessionDetails,
}

impl Session {
    pub(crate) fn new(id: String, session_type: SessionType, details: SessionDetails) -> Self {
        let now = Utc::now();
        Self {
            id,
            session_type,
            state: SessionState::Pending,
            created_at: now,
            updated_at: now,
            details,
        }
    }

    /// Refresh `updated_at`, never moving it backwards
    pub(crate) fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

use async_trait::async_trait;
use tracing::info;
use voicegw_registry_core::{SessionDetails, SessionState, SessionType};

use crate::client::SessionRegistryClient;
use crate::error::Result;

/// Client that only logs; every call succeeds
#[derive(Debug, Clone, Default)]
pub struct LoggingRegistryClient;

impl LoggingRegistryClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionRegistryClient for LoggingRegistryClient {
    async fn register_session(
        &self,
        id: &str,
        session_type: SessionType,
        details: SessionDetails,
    ) -> Result<()> {
        info!(session_id = %id, session_type = %session_type, ?details, "register session (logging client)");
        Ok(())
    }

    async fn update_session_state(&self, id: &str, state: SessionState) -> Result<()> {
        info!(session_id = %id, state = %state, "update session state (logging client)");
        Ok(())
    }

    async fn deregister_session(&self, id: &str) -> Result<()> {
        info!(session_id = %id, "deregister session (logging client)");
        Ok(())
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use voicegw_registry_core::{SessionDetails, SessionRegistry, SessionState, SessionType};

use crate::client::SessionRegistryClient;
use crate::error::Result;

/// Client calling a registry living in the same process
#[derive(Debug, Clone)]
pub struct LocalRegistryClient {
    registry: Arc<SessionRegistry>,
}

impl LocalRegistryClient {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}

#[async_trait]
impl SessionRegistryClient for LocalRegistryClient {
    async fn register_session(
        &self,
        id: &str,
        session_type: SessionType,
        details: SessionDetails,
    ) -> Result<()> {
        self.registry.create(id, session_type, details)?;
        Ok(())
    }

    async fn update_session_state(&self, id: &str, state: SessionState) -> Result<()> {
        self.registry.update_state(id, state)?;
        Ok(())
    }

    async fn deregister_session(&self, id: &str) -> Result<()> {
        self.registry.delete(id)?;
        Ok(())
    }
}

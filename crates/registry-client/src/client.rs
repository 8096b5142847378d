use async_trait::async_trait;
use voicegw_registry_core::{SessionDetails, SessionState, SessionType};

use crate::error::{ClientError, Result};

/// The three lifecycle operations protocol engines perform on the registry
///
/// Implementations never retry; every call either succeeds or returns a
/// typed [`ClientError`].
#[async_trait]
pub trait SessionRegistryClient: Send + Sync {
    /// Create a `Pending` session
    async fn register_session(
        &self,
        id: &str,
        session_type: SessionType,
        details: SessionDetails,
    ) -> Result<()>;

    async fn update_session_state(&self, id: &str, state: SessionState) -> Result<()>;

    async fn deregister_session(&self, id: &str) -> Result<()>;
}

/// Conveniences built on the lifecycle operations of every client
#[async_trait]
pub trait SessionRegistryClientExt: SessionRegistryClient {
    /// Deregister, treating an already-absent session as success
    async fn release_session(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl<T: SessionRegistryClient + ?Sized> SessionRegistryClientExt for T {
    async fn release_session(&self, id: &str) -> Result<()> {
        match self.deregister_session(id).await {
            Err(ClientError::SessionNotFound(_)) => Ok(()),
            other => other,
        }
    }
}

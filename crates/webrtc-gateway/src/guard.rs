use std::sync::Arc;

use tracing::{info, warn};
use voicegw_registry_client::{SessionRegistryClient, SessionRegistryClientExt};

/// Deregisters a session exactly once
///
/// Call [`RegistrationGuard::release`] on the normal exit path. If the guard
/// is dropped unreleased (the owning task was cancelled or unwound), the
/// deregistration is spawned onto the current runtime instead. Either way the
/// registry call runs in its own task, so it completes even if the owner is
/// aborted while waiting for it.
pub struct RegistrationGuard {
    registry: Arc<dyn SessionRegistryClient>,
    session_id: String,
    released: bool,
}

impl RegistrationGuard {
    pub fn new(registry: Arc<dyn SessionRegistryClient>, session_id: impl Into<String>) -> Self {
        Self {
            registry,
            session_id: session_id.into(),
            released: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn release(mut self) {
        self.released = true;
        let task = tokio::spawn(deregister(self.registry.clone(), self.session_id.clone()));
        if let Err(e) = task.await {
            warn!(session_id = %self.session_id, error = %e, "Deregistration task failed");
        }
    }
}

async fn deregister(registry: Arc<dyn SessionRegistryClient>, session_id: String) {
    match registry.release_session(&session_id).await {
        Ok(()) => info!(session_id = %session_id, "Session deregistered"),
        Err(e) => warn!(session_id = %session_id, error = %e, "Failed to deregister session"),
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(deregister(self.registry.clone(), self.session_id.clone()));
            }
            Err(_) => warn!(
                session_id = %self.session_id,
                "No runtime available, session left registered"
            ),
        }
    }
}

impl std::fmt::Debug for RegistrationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationGuard")
            .field("session_id", &self.session_id)
            .field("released", &self.released)
            .finish()
    }
}

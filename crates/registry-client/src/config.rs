use serde::{Deserialize, Serialize};

/// Where a remote registry lives and how long to wait for it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryClientConfig {
    /// Base URL of the registry API
    pub endpoint: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RegistryClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 5_000,
        }
    }
}

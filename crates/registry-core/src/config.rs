use serde::{Deserialize, Serialize};

/// Registry API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryApiConfig {
    /// Address the HTTP API binds to
    pub listen_addr: String,
}

impl Default for RegistryApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

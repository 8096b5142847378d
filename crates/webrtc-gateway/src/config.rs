use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// WebRTC signaling front-end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebRtcConfig {
    /// HTTP address serving the `/ws` signaling endpoint
    pub listen_addr: SocketAddr,
    pub stun_servers: Vec<String>,
    pub turn_servers: Vec<String>,
    /// Credentials applied to every TURN server
    pub turn_username: Option<String>,
    pub turn_credential: Option<String>,
}

impl Default for WebRtcConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            stun_servers: vec!["stun:stun.l.google.com:19302".to_string()],
            turn_servers: Vec::new(),
            turn_username: None,
            turn_credential: None,
        }
    }
}

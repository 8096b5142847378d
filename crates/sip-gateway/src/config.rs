use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// SIP front-end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SipConfig {
    /// UDP address to listen on
    pub listen_addr: SocketAddr,
    /// Host advertised in Contact and SDP; defaults to the bound address
    pub contact_host: Option<String>,
    /// Port advertised in Contact; defaults to the bound port
    pub contact_port: Option<u16>,
    /// Largest datagram accepted, in bytes
    pub recv_buffer_size: usize,
    /// Capacity of the transport event channel
    pub channel_capacity: usize,
    /// Pause between `100 Trying` and `180 Ringing`
    pub ring_delay_ms: u64,
    /// Pause between `180 Ringing` and `200 OK`
    pub answer_delay_ms: u64,
    /// Emit placeholder audio for answered calls
    pub simulate_media: bool,
    pub media_frames: u32,
    pub media_frame_interval_ms: u64,
}

impl Default for SipConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5060)),
            contact_host: None,
            contact_port: None,
            recv_buffer_size: 2048,
            channel_capacity: 100,
            ring_delay_ms: 100,
            answer_delay_ms: 500,
            simulate_media: true,
            media_frames: 5,
            media_frame_interval_ms: 20,
        }
    }
}

impl SipConfig {
    pub fn ring_delay(&self) -> Duration {
        Duration::from_millis(self.ring_delay_ms)
    }

    pub fn answer_delay(&self) -> Duration {
        Duration::from_millis(self.answer_delay_ms)
    }

    pub fn media_frame_interval(&self) -> Duration {
        Duration::from_millis(self.media_frame_interval_ms)
    }
}

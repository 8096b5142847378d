//! Process configuration

use serde::{Deserialize, Serialize};
use voicegw_infra_common::LoggingConfig;
use voicegw_media_core::MediaConfig;
use voicegw_registry_client::RegistryClientConfig;
use voicegw_registry_core::RegistryApiConfig;
use voicegw_sip_gateway::SipConfig;
use voicegw_webrtc_gateway::WebRtcConfig;

/// Registry API served by this process and the remote one used by `gateway`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub api: RegistryApiConfig,
    pub client: RegistryClientConfig,
}

/// Every section of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub logging: LoggingConfig,
    pub registry: RegistrySection,
    pub sip: SipConfig,
    pub webrtc: WebRtcConfig,
    pub media: MediaConfig,
}

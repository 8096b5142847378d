use thiserror::Error;
use voicegw_registry_client::ClientError;

/// Result type for WebRTC signaling operations
pub type Result<T> = std::result::Result<T, WebRtcError>;

/// Errors from the WebRTC signaling front-end
///
/// The display text of engine and payload errors is sent to the browser in
/// `error` signal messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebRtcError {
    #[error("Invalid offer SDP")]
    InvalidOffer,

    #[error("Invalid ICE candidate")]
    InvalidCandidate,

    #[error("Invalid signal message: {0}")]
    InvalidMessage(String),

    /// The media engine refused an operation
    #[error("{0}")]
    Engine(String),

    #[error("Session registration failed: {0}")]
    Registration(#[from] ClientError),

    /// The signaling channel could not be written
    #[error("Signaling channel error: {0}")]
    Channel(String),

    #[error("Invalid WebRTC configuration: {0}")]
    Configuration(String),
}

impl WebRtcError {
    pub fn engine(context: &str, err: impl std::fmt::Display) -> Self {
        WebRtcError::Engine(format!("{}: {}", context, err))
    }
}

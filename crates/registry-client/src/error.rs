use thiserror::Error;
use voicegw_registry_core::RegistryError;

/// Result type for registry client calls
pub type Result<T> = std::result::Result<T, ClientError>;

/// Typed failure of a registry client call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The registry already holds a session with this id
    #[error("Session already registered: {0}")]
    DuplicateSession(String),

    /// The registry has no session with this id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Transport failure or timeout reaching the registry
    #[error("Session registry unavailable: {0}")]
    Unavailable(String),

    /// The registry answered with an unexpected status
    #[error("Session registry rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid registry client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::SessionNotFound(_))
    }

    /// Failures a caller may reasonably try again later
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Unavailable(_))
    }
}

impl From<RegistryError> for ClientError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateSession(id) => ClientError::DuplicateSession(id),
            RegistryError::SessionNotFound(id) => ClientError::SessionNotFound(id),
            RegistryError::InvalidRequest(msg) => ClientError::Rejected { status: 400, body: msg },
            RegistryError::Io(msg) => ClientError::Unavailable(msg),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Unavailable(format!("request timed out: {}", err))
        } else {
            ClientError::Unavailable(err.to_string())
        }
    }
}

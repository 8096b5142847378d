use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors returned by the session registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A session with this id already exists; the existing record is untouched
    #[error("Session already exists: {0}")]
    DuplicateSession(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Malformed or incomplete request (API layer)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Listener or socket failure while serving the API
    #[error("I/O error: {0}")]
    Io(String),
}

impl RegistryError {
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateSession(id.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound(id.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

use thiserror::Error;

/// Result type for media hand-off operations
pub type Result<T> = std::result::Result<T, MediaError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// The stream ingester could not be reached or timed out
    #[error("Stream ingester unavailable: {0}")]
    IngesterUnavailable(String),

    /// The stream ingester refused the segment
    #[error("Stream ingester rejected segment with status {status}")]
    Rejected { status: u16 },

    #[error("Invalid media configuration: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        MediaError::IngesterUnavailable(err.to_string())
    }
}

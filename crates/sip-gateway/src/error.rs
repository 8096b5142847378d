use thiserror::Error;

/// Result type for SIP transport and gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why an inbound datagram was discarded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no CRLF found for request line")]
    MissingRequestLineTerminator,

    #[error("invalid request line format: '{0}'")]
    MalformedRequestLine(String),

    #[error("request line is not valid UTF-8")]
    InvalidEncoding,

    #[error("invalid request target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("cannot resolve request target '{0}'")]
    UnresolvableTarget(String),

    #[error("missing CRLF after a header line")]
    UnterminatedHeader,
}

/// Errors from the SIP transport and gateway
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Invalid SIP configuration: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

//! Parsed SIP request and header names

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;

pub const HEADER_VIA: &str = "Via";
pub const HEADER_TO: &str = "To";
pub const HEADER_FROM: &str = "From";
pub const HEADER_CALL_ID: &str = "Call-ID";
pub const HEADER_CSEQ: &str = "CSeq";
pub const HEADER_CONTACT: &str = "Contact";
pub const HEADER_MAX_FORWARDS: &str = "Max-Forwards";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";

/// Map a header name, long or compact form in any case, to its canonical spelling
///
/// Unknown names are returned as given.
pub fn canonical_header_name(name: &str) -> String {
    let canonical = match name.to_ascii_lowercase().as_str() {
        "via" | "v" => HEADER_VIA,
        "to" | "t" => HEADER_TO,
        "from" | "f" => HEADER_FROM,
        "call-id" | "i" => HEADER_CALL_ID,
        "cseq" => HEADER_CSEQ,
        "contact" | "m" => HEADER_CONTACT,
        "max-forwards" => HEADER_MAX_FORWARDS,
        "content-type" | "c" => HEADER_CONTENT_TYPE,
        "content-length" | "l" => HEADER_CONTENT_LENGTH,
        _ => return name.to_string(),
    };
    canonical.to_string()
}

/// Request method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Invite,
    Ack,
    Bye,
    Cancel,
    Options,
    Register,
    /// Any other token, kept verbatim
    Other(String),
}

impl Method {
    pub fn from_token(token: &str) -> Self {
        match token {
            "INVITE" => Method::Invite,
            "ACK" => Method::Ack,
            "BYE" => Method::Bye,
            "CANCEL" => Method::Cancel,
            "OPTIONS" => Method::Options,
            "REGISTER" => Method::Register,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Invite => "INVITE",
            Method::Ack => "ACK",
            Method::Bye => "BYE",
            Method::Cancel => "CANCEL",
            Method::Options => "OPTIONS",
            Method::Register => "REGISTER",
            Method::Other(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound SIP request; one per datagram
#[derive(Debug, Clone, PartialEq)]
pub struct SignalingRequest {
    pub method: Method,
    /// Request-URI as received
    pub target_uri: String,
    /// Request-URI resolved to a network address
    pub target: SocketAddr,
    pub version: String,
    /// Canonical header name to value; the last occurrence of a name wins
    pub headers: HashMap<String, String>,
    /// Bytes after the blank line, if any
    pub body: Option<Bytes>,
}

impl SignalingRequest {
    /// Header value by name, long or compact form in any case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_name(name))
            .map(String::as_str)
    }

    pub fn call_id(&self) -> Option<&str> {
        self.header(HEADER_CALL_ID).filter(|id| !id.is_empty())
    }
}

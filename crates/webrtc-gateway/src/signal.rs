//! Messages exchanged with the browser over the signaling channel

use serde::{Deserialize, Serialize};

pub const TYPE_OFFER: &str = "offer";
pub const TYPE_ANSWER: &str = "answer";
pub const TYPE_CANDIDATE: &str = "candidate";
pub const TYPE_ERROR: &str = "error";

/// Payload of the `error` reply to a message of unrecognised type
pub const UNKNOWN_TYPE_PAYLOAD: &str = "Unknown message type";

/// One signaling message
///
/// `payload` is opaque text: JSON session descriptions and candidates for
/// `offer`, `answer` and `candidate`, a human readable reason for `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: String,
}

/// Recognised message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
    Error,
    Unknown,
}

impl SignalMessage {
    pub fn new(kind: &str, payload: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            payload: payload.into(),
        }
    }

    pub fn answer(payload: impl Into<String>) -> Self {
        Self::new(TYPE_ANSWER, payload)
    }

    pub fn candidate(payload: impl Into<String>) -> Self {
        Self::new(TYPE_CANDIDATE, payload)
    }

    pub fn error(payload: impl Into<String>) -> Self {
        Self::new(TYPE_ERROR, payload)
    }

    pub fn kind(&self) -> SignalKind {
        match self.kind.as_str() {
            TYPE_OFFER => SignalKind::Offer,
            TYPE_ANSWER => SignalKind::Answer,
            TYPE_CANDIDATE => SignalKind::Candidate,
            TYPE_ERROR => SignalKind::Error,
            _ => SignalKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_string(&SignalMessage::error(UNKNOWN_TYPE_PAYLOAD)).unwrap();
        assert_eq!(json, r#"{"type":"error","payload":"Unknown message type"}"#);

        let msg: SignalMessage = serde_json::from_str(r#"{"type":"offer","payload":"{}"}"#).unwrap();
        assert_eq!(msg.kind(), SignalKind::Offer);

        let msg: SignalMessage = serde_json::from_str(r#"{"type":"bye"}"#).unwrap();
        assert_eq!(msg.kind(), SignalKind::Unknown);
        assert_eq!(msg.payload, "");
    }
}

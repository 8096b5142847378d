//! Audio segment record handed to the stream ingester

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Encoding of an audio segment's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AudioFormat {
    /// G.711 mu-law, 8 kHz
    Pcmu,
    /// Signed 16-bit little-endian PCM
    Linear16,
    /// Undecoded Opus frames
    Opus,
}

/// One captured audio frame of a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSegment {
    pub session_id: String,
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    pub format: AudioFormat,
    /// Increases by one per segment within a call
    pub sequence_number: u32,
    pub data: Bytes,
    /// Last segment of the call
    pub is_final: bool,
}

impl AudioSegment {
    /// Segment stamped with the current time
    pub fn new(
        session_id: impl Into<String>,
        format: AudioFormat,
        sequence_number: u32,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            format,
            sequence_number,
            data: data.into(),
            is_final: false,
        }
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }
}

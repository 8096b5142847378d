use std::time::Duration;

use tracing::debug;

use crate::handoff::MediaHandoff;
use crate::types::{AudioFormat, AudioSegment};

const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Placeholder audio for a call whose RTP stream is not decoded
///
/// Emits `frames` PCMU-tagged segments, sequence numbers `1..=frames`, one
/// per `interval`. The last one is flagged final. A zero `interval` is
/// raised to one millisecond.
pub async fn simulate_call_audio(
    handoff: MediaHandoff,
    session_id: String,
    frames: u32,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval.max(MIN_FRAME_INTERVAL));
    // The first tick of a tokio interval completes immediately
    ticker.tick().await;

    for seq in 1..=frames {
        ticker.tick().await;
        let payload = format!("RTP Packet {} for {}", seq, session_id);
        let segment = AudioSegment::new(session_id.clone(), AudioFormat::Pcmu, seq, payload)
            .with_final(seq == frames);
        handoff.submit(segment);
    }

    debug!(session_id = %session_id, frames, "Simulated audio finished");
}

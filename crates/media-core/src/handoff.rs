use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::ingest::StreamIngester;
use crate::types::AudioSegment;

/// Fire-and-forget forwarding of audio segments
///
/// Every segment is sent from its own task; ingest failures are logged and
/// never reach the caller.
#[derive(Clone)]
pub struct MediaHandoff {
    ingester: Arc<dyn StreamIngester>,
}

impl MediaHandoff {
    pub fn new(ingester: Arc<dyn StreamIngester>) -> Self {
        Self { ingester }
    }

    /// Dispatch one segment; the returned handle may be ignored
    pub fn submit(&self, segment: AudioSegment) -> JoinHandle<()> {
        let ingester = self.ingester.clone();
        tokio::spawn(async move {
            let session_id = segment.session_id.clone();
            let seq = segment.sequence_number;
            if let Err(e) = ingester.ingest(segment).await {
                warn!(session_id = %session_id, seq, error = %e, "Failed to hand off audio segment");
            }
        })
    }
}

impl std::fmt::Debug for MediaHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHandoff").finish_non_exhaustive()
    }
}

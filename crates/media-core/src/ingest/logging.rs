use async_trait::async_trait;
use tracing::debug;

use super::StreamIngester;
use crate::error::Result;
use crate::types::AudioSegment;

/// Ingester that only logs segment metadata
#[derive(Debug, Clone, Default)]
pub struct LoggingIngester;

#[async_trait]
impl StreamIngester for LoggingIngester {
    async fn ingest(&self, segment: AudioSegment) -> Result<()> {
        debug!(
            session_id = %segment.session_id,
            seq = segment.sequence_number,
            format = ?segment.format,
            bytes = segment.data.len(),
            is_final = segment.is_final,
            "Audio segment ingested (logging ingester)"
        );
        Ok(())
    }
}

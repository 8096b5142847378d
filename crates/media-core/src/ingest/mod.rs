//! Stream ingester boundary
//!
//! The downstream audio processor is reached through [`StreamIngester`];
//! which implementation is used is decided when the process is wired.

mod http;
mod logging;

pub use http::HttpIngester;
pub use logging::LoggingIngester;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::AudioSegment;

/// Consumer of audio segments
#[async_trait]
pub trait StreamIngester: Send + Sync {
    async fn ingest(&self, segment: AudioSegment) -> Result<()>;
}

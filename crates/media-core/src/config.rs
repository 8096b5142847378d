use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ingest::{HttpIngester, LoggingIngester, StreamIngester};

/// Media hand-off settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// URL segments are posted to; logged only when unset
    pub ingest_endpoint: Option<String>,
    /// Per-segment timeout in milliseconds
    pub ingest_timeout_ms: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ingest_endpoint: None,
            ingest_timeout_ms: 5_000,
        }
    }
}

impl MediaConfig {
    /// Build the ingester this configuration selects
    pub fn build_ingester(&self) -> Result<Arc<dyn StreamIngester>> {
        match &self.ingest_endpoint {
            Some(endpoint) => Ok(Arc::new(HttpIngester::new(
                endpoint,
                Duration::from_millis(self.ingest_timeout_ms),
            )?)),
            None => Ok(Arc::new(LoggingIngester)),
        }
    }
}

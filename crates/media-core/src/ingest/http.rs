use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::StreamIngester;
use crate::error::{MediaError, Result};
use crate::types::AudioSegment;

/// Ingester posting each segment as JSON to a fixed URL
#[derive(Debug, Clone)]
pub struct HttpIngester {
    client: Client,
    endpoint: Url,
}

impl HttpIngester {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| MediaError::Configuration(format!("{}: {}", endpoint, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediaError::Configuration(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl StreamIngester for HttpIngester {
    async fn ingest(&self, segment: AudioSegment) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&segment)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(MediaError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

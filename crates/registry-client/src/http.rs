//! Registry client over HTTP/JSON
//!
//! Talks to the routes served by `voicegw_registry_core::api`:
//! `POST /sessions` (201), `PUT /sessions/{id}/state` (200) and
//! `DELETE /sessions/{id}` (204). A 409 maps to
//! [`ClientError::DuplicateSession`], a 404 to [`ClientError::SessionNotFound`];
//! connection failures and timeouts surface as [`ClientError::Unavailable`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, warn};
use voicegw_registry_core::api::types::{CreateSessionRequest, UpdateStateRequest};
use voicegw_registry_core::{SessionDetails, SessionState, SessionType};

use crate::client::SessionRegistryClient;
use crate::config::RegistryClientConfig;
use crate::error::{ClientError, Result};

/// Remote registry client with a bounded per-request timeout
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
    base: Url,
}

impl HttpRegistryClient {
    pub fn new(config: &RegistryClientConfig) -> Result<Self> {
        let base = Url::parse(&config.endpoint)
            .map_err(|e| ClientError::Configuration(format!("{}: {}", config.endpoint, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "{} cannot be used as a base URL",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Configuration(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn expect(&self, response: Response, expected: StatusCode, id: &str) -> Result<()> {
        let status = response.status();
        if status == expected {
            return Ok(());
        }

        match status {
            StatusCode::CONFLICT => Err(ClientError::DuplicateSession(id.to_string())),
            StatusCode::NOT_FOUND => Err(ClientError::SessionNotFound(id.to_string())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!(session_id = %id, status = status.as_u16(), %body, "Unexpected registry response");
                Err(ClientError::Rejected {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl SessionRegistryClient for HttpRegistryClient {
    async fn register_session(
        &self,
        id: &str,
        session_type: SessionType,
        details: SessionDetails,
    ) -> Result<()> {
        let url = self.url(&["sessions"])?;
        let body = CreateSessionRequest {
            id: id.to_string(),
            session_type,
            details: Some(details),
        };

        debug!(session_id = %id, %url, "POST register session");
        let response = self.client.post(url).json(&body).send().await?;
        self.expect(response, StatusCode::CREATED, id).await
    }

    async fn update_session_state(&self, id: &str, state: SessionState) -> Result<()> {
        let url = self.url(&["sessions", id, "state"])?;

        debug!(session_id = %id, %url, state = %state, "PUT session state");
        let response = self
            .client
            .put(url)
            .json(&UpdateStateRequest { state })
            .send()
            .await?;
        self.expect(response, StatusCode::OK, id).await
    }

    async fn deregister_session(&self, id: &str) -> Result<()> {
        let url = self.url(&["sessions", id])?;

        debug!(session_id = %id, %url, "DELETE session");
        let response = self.client.delete(url).send().await?;
        self.expect(response, StatusCode::NO_CONTENT, id).await
    }
}

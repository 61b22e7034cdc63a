//! Mixpanel Event Sink
//!
//! Posts encoded events to the Mixpanel `/track` ingestion endpoint

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, error};
use url::Url;

use crate::error::UpstreamError;
use crate::services::sink::EventSink;
use crate::types::{ForwardQuery, UpstreamResponse};

/// Sink that forwards events to the Mixpanel ingestion API
pub struct MixpanelSink {
    /// Ingestion endpoint, e.g. `https://api.mixpanel.com/track/`
    endpoint: Url,
    /// HTTP client (shared connection pool)
    client: Client,
}

impl MixpanelSink {
    /// Create a sink with a default HTTP client.
    ///
    /// No request timeout is configured; the client's defaults apply.
    pub fn new(endpoint: Url) -> Result<Self, UpstreamError> {
        let client = Client::builder().build().map_err(|e| {
            error!("Failed to create HTTP client: {}", e);
            UpstreamError::Client(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self::with_client(endpoint, client))
    }

    pub fn with_client(endpoint: Url, client: Client) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EventSink for MixpanelSink {
    async fn send(&self, encoded_event: &str) -> Result<UpstreamResponse, UpstreamError> {
        debug!(
            "Forwarding event to {} ({} encoded bytes)",
            self.endpoint,
            encoded_event.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&ForwardQuery::verbose(encoded_event))
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response.headers().get(CONTENT_TYPE).cloned();

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Body(e.to_string()))?;

        debug!("Upstream accepted event with status {}", status);

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }

    fn sink_name(&self) -> &'static str {
        "mixpanel"
    }
}

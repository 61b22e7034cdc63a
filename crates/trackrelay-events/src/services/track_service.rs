use std::sync::Arc;
use tracing::{debug, error};
use trackrelay_config::Credential;

use crate::error::{TrackError, TrackResult};
use crate::services::payload::EventPayload;
use crate::services::sink::EventSink;
use crate::types::UpstreamResponse;

/// Validates client events, injects the project token and forwards them
pub struct TrackService {
    credential: Credential,
    sink: Arc<dyn EventSink>,
}

impl TrackService {
    pub fn new(credential: Credential, sink: Arc<dyn EventSink>) -> Self {
        Self { credential, sink }
    }

    /// Relay one raw request body.
    ///
    /// Invalid bodies are rejected before the sink is touched; at most one
    /// upstream call is made per invocation and it is never retried.
    pub async fn track(&self, body: &[u8]) -> TrackResult<UpstreamResponse> {
        let mut payload = EventPayload::from_slice(body).map_err(|e| {
            debug!("Rejected track request: {}", e);
            e
        })?;

        payload.inject_credential(&self.credential);
        let encoded = payload.encode()?;

        debug!(
            "Relaying event {:?} via {}",
            payload.event_name().unwrap_or("<unnamed>"),
            self.sink.sink_name()
        );

        self.sink.send(&encoded).await.map_err(|e| {
            error!("Error forwarding data to Mixpanel: {}", e);
            TrackError::from(e)
        })
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.sink_name()
    }
}

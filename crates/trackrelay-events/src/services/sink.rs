//! Event Sink Trait
//!
//! Defines the interface for upstream ingestion backends

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::types::UpstreamResponse;

/// Destination for encoded events - implement this for each ingestion API
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one base64-encoded event.
    ///
    /// Returns the upstream response on a 2xx status and an error for
    /// anything else, including transport failures.
    async fn send(&self, encoded_event: &str) -> Result<UpstreamResponse, UpstreamError>;

    /// Get the name of this sink (for logging/debugging)
    fn sink_name(&self) -> &'static str;
}

//! trackrelay-events: analytics event relay
//!
//! Accepts client events on `POST /track`, injects the server-held Mixpanel
//! project token and forwards them base64-encoded to the ingestion API.

pub mod error;
pub mod handlers;
pub mod services;
pub mod types;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use trackrelay_config::RelayConfig;

pub use error::{TrackError, TrackResult, UpstreamError};
pub use handlers::{configure_routes, AppState, TrackApiDoc};
pub use services::{EventPayload, EventSink, MixpanelSink, TrackService};
pub use types::*;

/// Build the relay router around an arbitrary sink
pub fn build_router(config: &RelayConfig, sink: Arc<dyn EventSink>) -> Router {
    let track_service = Arc::new(TrackService::new(config.credential.clone(), sink));

    configure_routes(config.max_body_bytes)
        .with_state(Arc::new(AppState { track_service }))
        .layer(TraceLayer::new_for_http())
}

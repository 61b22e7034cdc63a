use axum::{
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::TrackError;
use crate::services::TrackService;
use crate::types::{ErrorResponse, TrackEventRequest};

pub struct AppState {
    pub track_service: Arc<TrackService>,
}

/// Relay an analytics event to Mixpanel
///
/// The body must be a JSON object. `properties.token` is set to the
/// server-held project token before the event is forwarded; the upstream
/// status and body are returned unchanged.
#[utoipa::path(
    post,
    path = "/track",
    request_body = TrackEventRequest,
    responses(
        (status = 200, description = "Upstream response, relayed verbatim"),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 413, description = "Body exceeds the configured limit", body = ErrorResponse),
        (status = 500, description = "Upstream call failed", body = ErrorResponse)
    ),
    tag = "Tracking"
)]
pub async fn track_event(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            debug!("Rejected oversized track request: {}", rejection);
            return TrackError::PayloadTooLarge.into_response();
        }
        Err(rejection) => {
            debug!("Failed to read track request body: {}", rejection);
            return TrackError::InvalidPayload(rejection.body_text()).into_response();
        }
    };

    match state.track_service.track(&body).await {
        Ok(upstream) => {
            info!("Event relayed, upstream status {}", upstream.status);
            upstream.into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Configure routes for event relaying
pub fn configure_routes(max_body_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/track", post(track_event))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(track_event),
    components(schemas(TrackEventRequest, ErrorResponse)),
    tags(
        (name = "Tracking", description = "Analytics event relay")
    )
)]
pub struct TrackApiDoc;

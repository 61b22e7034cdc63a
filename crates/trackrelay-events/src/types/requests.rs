use serde::Serialize;
use utoipa::ToSchema;

/// Event submitted to `POST /track`.
///
/// Only `properties` is interpreted by the relay; every other field is
/// forwarded as received. The handler reads raw bytes, so this type only
/// documents the body in the OpenAPI schema.
#[derive(Debug, ToSchema)]
#[schema(example = json!({"event": "play", "properties": {"distinct_id": "user-42"}}))]
pub struct TrackEventRequest {
    /// Event name as understood by Mixpanel
    pub event: Option<String>,
    /// Event properties. `token` is always replaced by the relay.
    #[schema(value_type = Option<Object>)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Query string of the outbound ingestion call
#[derive(Debug, Serialize)]
pub struct ForwardQuery<'a> {
    /// Base64 of the compact JSON event
    pub data: &'a str,
    pub verbose: u8,
}

impl<'a> ForwardQuery<'a> {
    pub fn verbose(data: &'a str) -> Self {
        Self { data, verbose: 1 }
    }
}

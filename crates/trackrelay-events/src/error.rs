//! Error types for the track relay

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::types::ErrorResponse;

pub const INVALID_DATA_FORMAT: &str = "Invalid data format";
pub const PAYLOAD_TOO_LARGE: &str = "Payload too large";
pub const FORWARD_FAILED: &str = "Failed to forward data to Mixpanel";

pub type TrackResult<T> = Result<T, TrackError>;

/// Errors raised while calling the upstream ingestion API
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upstream returned status {status}")]
    Status { status: u16 },

    #[error("Failed to read upstream response: {0}")]
    Body(String),
}

/// Errors surfaced by the `/track` endpoint
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Invalid data format: {0}")]
    InvalidPayload(String),

    #[error("Request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("Failed to encode event: {0}")]
    Encoding(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl TrackError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            TrackError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            TrackError::Encoding(_) | TrackError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Caller-visible message. Never carries the underlying cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            TrackError::InvalidPayload(_) => INVALID_DATA_FORMAT,
            TrackError::PayloadTooLarge => PAYLOAD_TOO_LARGE,
            TrackError::Encoding(_) | TrackError::Upstream(_) => FORWARD_FAILED,
        }
    }
}

impl IntoResponse for TrackError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse::new(self.public_message())),
        )
            .into_response()
    }
}

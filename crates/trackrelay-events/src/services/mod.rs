//! Track relay services
//!
//! Payload transformation, the upstream sink abstraction and the
//! Mixpanel-backed sink.

mod mixpanel_sink;
mod payload;
mod sink;
mod track_service;

pub use mixpanel_sink::MixpanelSink;
pub use payload::{EventPayload, PROPERTIES_KEY, TOKEN_KEY};
pub use sink::EventSink;
pub use track_service::TrackService;

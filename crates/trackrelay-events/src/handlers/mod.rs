//! HTTP handlers for the track relay

mod track_handler;

pub use track_handler::*;

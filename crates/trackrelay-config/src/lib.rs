mod service;

pub use service::{
    ConfigError, Credential, RelayConfig, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS, DEFAULT_UPSTREAM_URL,
};

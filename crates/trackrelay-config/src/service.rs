use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

// Defaults applied when the corresponding flag/env var is not set
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.mixpanel.com/track/";
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Mixpanel project token is not set (MIXPANEL_PROJECT_TOKEN)")]
    MissingCredential,

    #[error("Invalid upstream URL '{url}': {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Request body limit must be greater than zero")]
    InvalidBodyLimit,
}

/// Server-held project token injected into every forwarded event.
///
/// The value is never printed through `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for a missing or blank token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub credential: Credential,
    pub listen_address: SocketAddr,
    pub upstream_url: Url,
    pub max_body_bytes: usize,
    pub shutdown_timeout: Duration,
}

impl RelayConfig {
    /// Validate raw settings into a configuration.
    ///
    /// Fails with [`ConfigError::MissingCredential`] before anything else is
    /// checked so a relay without a token never gets as far as binding.
    pub fn new(
        token: Option<String>,
        host: &str,
        port: u16,
        upstream_url: &str,
        max_body_bytes: usize,
        shutdown_timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let credential = token
            .and_then(Credential::new)
            .ok_or(ConfigError::MissingCredential)?;

        let ip: IpAddr = host.parse().map_err(|e| ConfigError::InvalidAddress {
            address: format!("{}:{}", host, port),
            reason: format!("{}", e),
        })?;
        let listen_address = SocketAddr::new(ip, port);

        let upstream_url = Self::parse_upstream_url(upstream_url)?;

        if max_body_bytes == 0 {
            return Err(ConfigError::InvalidBodyLimit);
        }

        debug!(
            "Relay configured: listen={} upstream={} max_body_bytes={}",
            listen_address, upstream_url, max_body_bytes
        );

        Ok(Self {
            credential,
            listen_address,
            upstream_url,
            max_body_bytes,
            shutdown_timeout: Duration::from_secs(shutdown_timeout_secs),
        })
    }

    /// Configuration with defaults for everything except the token
    pub fn with_defaults(token: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(
            Some(token.into()),
            DEFAULT_HOST,
            DEFAULT_PORT,
            DEFAULT_UPSTREAM_URL,
            DEFAULT_MAX_BODY_BYTES,
            DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        )
    }

    fn parse_upstream_url(raw: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUpstreamUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUpstreamUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}

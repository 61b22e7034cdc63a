mod shutdown;

use axum::Router;
use clap::Args;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use trackrelay_config::{
    RelayConfig, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS, DEFAULT_UPSTREAM_URL,
};
use trackrelay_events::{build_router, EventSink, MixpanelSink, TrackApiDoc};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use shutdown::wait_for_shutdown_signal;

#[derive(Args)]
pub struct ServeCommand {
    /// Mixpanel project token injected into every event
    #[arg(long, env = "MIXPANEL_PROJECT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Host to bind the server to
    #[arg(long, default_value = DEFAULT_HOST, env = "TRACKRELAY_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    /// Upstream ingestion endpoint
    #[arg(long, default_value = DEFAULT_UPSTREAM_URL, env = "TRACKRELAY_UPSTREAM_URL")]
    pub upstream_url: String,

    /// Maximum accepted request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "TRACKRELAY_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Seconds to let in-flight requests finish after a shutdown signal
    #[arg(
        long,
        default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        env = "TRACKRELAY_SHUTDOWN_TIMEOUT"
    )]
    pub shutdown_timeout_secs: u64,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        // Validate before the runtime exists so a bad config never binds
        let config = RelayConfig::new(
            self.token,
            &self.host,
            self.port,
            &self.upstream_url,
            self.max_body_bytes,
            self.shutdown_timeout_secs,
        )
        .map_err(|e| {
            error!("{}", e);
            e
        })?;

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(run_relay(config))
    }
}

/// Relay router plus the OpenAPI document and Swagger UI
pub fn create_app(config: &RelayConfig, sink: Arc<dyn EventSink>) -> Router {
    build_router(config, sink).merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", TrackApiDoc::openapi()),
    )
}

async fn run_relay(config: RelayConfig) -> anyhow::Result<()> {
    let sink = Arc::new(MixpanelSink::new(config.upstream_url.clone())?);
    debug!("Using {} sink at {}", sink.sink_name(), sink.endpoint());

    let app = create_app(&config, sink);

    let listener = TcpListener::bind(config.listen_address).await?;
    info!("Relay server is running on {}", listener.local_addr()?);

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        wait_for_shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        result = &mut server => {
            result??;
        }
        _ = signalled_rx => {
            info!(
                "Draining in-flight requests (timeout {:?})",
                config.shutdown_timeout
            );
            match tokio::time::timeout(config.shutdown_timeout, &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    warn!(
                        "Shutdown timeout exceeded ({:?}), forcing shutdown",
                        config.shutdown_timeout
                    );
                    server.abort();
                }
            }
        }
    }

    info!("Relay server exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_openapi_document_is_served() -> Result<(), Box<dyn std::error::Error>> {
        let config = RelayConfig::with_defaults("T1")?;
        let sink = Arc::new(MixpanelSink::new(config.upstream_url.clone())?);
        let app = create_app(&config, sink);

        let request = Request::builder()
            .method("GET")
            .uri("/api-docs/openapi.json")
            .body(Body::empty())?;
        let response = app.oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await?.to_bytes();
        let doc: serde_json::Value = serde_json::from_slice(&body)?;
        assert!(doc["paths"]["/track"]["post"].is_object());
        Ok(())
    }

    #[test]
    fn test_missing_token_fails_before_binding() {
        let cmd = ServeCommand {
            token: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        };

        let err = cmd.execute().unwrap_err();
        assert!(err.to_string().contains("MIXPANEL_PROJECT_TOKEN"));
    }
}

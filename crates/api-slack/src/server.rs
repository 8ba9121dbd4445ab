//! Slack Events HTTP Server
//!
//! Serves `POST /slack/events` (signature-checked) and `GET /health`.

use crate::error::SlackError;
use crate::handler::{slack_events_handler, verify_slack_signature, SlackState};
use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use reviewq_core::application::ShutdownToken;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Slack Server Configuration
#[derive(Debug, Clone)]
pub struct SlackServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SlackServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "reviewq",
        "version": reviewq_core::VERSION,
    }))
}

/// Build the router; exposed so tests can drive it without a socket
pub fn router(state: Arc<SlackState>) -> Router {
    let events = Router::new()
        .route("/slack/events", post(slack_events_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_slack_signature,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(events)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Slack Server
pub struct SlackServer {
    config: SlackServerConfig,
    state: Arc<SlackState>,
}

impl SlackServer {
    pub fn new(config: SlackServerConfig, state: Arc<SlackState>) -> Self {
        Self { config, state }
    }

    /// Serve until the shutdown token fires
    pub async fn run(self, mut shutdown: ShutdownToken) -> Result<(), SlackError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Slack events server listening"
        );

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        info!("Slack events server stopped");
        Ok(())
    }
}

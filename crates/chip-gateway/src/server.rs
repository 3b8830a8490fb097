// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use chip_config::model::ServerConfig;
use chip_core::ChipError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::pipeline::WebhookPipeline;
use crate::registry::AdapterRegistry;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<AdapterRegistry>,
    pub pipeline: Arc<WebhookPipeline>,
    /// Provider used by the send API when the request names none.
    pub default_provider: String,
}

/// Build the router with every route mounted under `api_prefix`
/// (e.g. `/api/v1`; empty mounts at the root).
pub fn build_router(state: GatewayState, api_prefix: &str) -> Router {
    let prefix = api_prefix.trim_end_matches('/');

    Router::new()
        .route(
            &format!("{prefix}/webhooks/{{provider}}"),
            post(handlers::post_webhook),
        )
        .route(&format!("{prefix}/messages/send"), post(handlers::post_send_message))
        .route(&format!("{prefix}/test/agent"), post(handlers::post_test_agent))
        .route(&format!("{prefix}/health"), get(handlers::get_health))
        .route(&format!("{prefix}/healthz"), get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn start_server(config: &ServerConfig, router: Router) -> Result<(), ChipError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChipError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(prefix = %config.api_prefix, "Chip server listening on {addr}");

    axum::serve(listener, router)
        .await
        .map_err(|e| ChipError::Internal(format!("server error: {e}")))
}

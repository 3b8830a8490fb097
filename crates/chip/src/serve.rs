// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chip serve` command implementation.
//!
//! Initializes tracing, registers provider adapters, assembles the webhook
//! pipeline with in-process collaborators, and runs the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chip_config::ChipConfig;
use chip_core::ChipError;
use chip_dedup::DedupCache;
use chip_gateway::{
    AdapterRegistry, Collaborators, GatewayState, PipelineSettings, WebhookPipeline, build_router,
    start_server,
};
use chip_loop::LoopAdapter;
use chip_sms::TwilioAdapter;
use tracing::info;

/// Runs the `chip serve` command until the server stops.
pub async fn run_serve(config: ChipConfig) -> Result<(), ChipError> {
    init_tracing(&config.agent.log_level);

    let router = build_app(&config)?;
    info!(
        agent = %config.agent.name,
        version = env!("CARGO_PKG_VERSION"),
        "chip starting"
    );
    start_server(&config.server, router).await
}

/// Register the provider adapters enabled by `config`.
///
/// LoopMessage is always registered; Twilio only when configured.
fn build_registry(config: &ChipConfig) -> Result<AdapterRegistry, ChipError> {
    let registry = AdapterRegistry::new();
    registry.register(Arc::new(LoopAdapter::new(config.loop_message.clone())?));
    if config.twilio.is_active() {
        registry.register(Arc::new(TwilioAdapter::new(config.twilio.clone())?));
    }

    if registry.get(&config.server.default_provider).is_err() {
        return Err(ChipError::Config(format!(
            "server.default_provider '{}' is not registered (available: {})",
            config.server.default_provider,
            registry.names().join(", ")
        )));
    }
    Ok(registry)
}

/// Assemble the full router from configuration.
fn build_app(config: &ChipConfig) -> Result<Router, ChipError> {
    let registry = Arc::new(build_registry(config)?);
    let dedup = Arc::new(DedupCache::new(
        Duration::from_secs(config.dedup.ttl_secs),
        Duration::from_secs(config.dedup.window_secs),
    ));
    let pipeline = WebhookPipeline::new(
        PipelineSettings::from_config(config),
        dedup,
        Collaborators::in_process(config),
    );

    let state = GatewayState {
        registry,
        pipeline: Arc::new(pipeline),
        default_provider: config.server.default_provider.clone(),
    };
    Ok(build_router(state, &config.server.api_prefix))
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over `log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chip={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook gateway for the Chip messaging agent.
//!
//! Provides the adapter registry, the shared webhook pipeline, and the axum
//! HTTP surface:
//! - `POST {prefix}/webhooks/{provider}` inbound provider webhooks
//! - `POST {prefix}/messages/send` explicit outbound sends
//! - `GET {prefix}/health` liveness and registered providers

pub mod handlers;
pub mod pipeline;
pub mod registry;
pub mod server;

#[cfg(test)]
mod test_support;

pub use pipeline::{Collaborators, PipelineSettings, WebhookOutcome, WebhookPipeline};
pub use registry::AdapterRegistry;
pub use server::{GatewayState, build_router, start_server};

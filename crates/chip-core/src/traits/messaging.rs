// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging adapter trait for providers (LoopMessage, Twilio, ...).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ChipError;
use crate::message::OutboundMessage;
use crate::types::{NormalizedEvent, SendResult};

/// Adapter for a messaging provider.
///
/// Adapters translate between one provider's webhook and send APIs and the
/// provider-agnostic [`NormalizedEvent`] / [`OutboundMessage`] model.
#[async_trait]
pub trait MessagingAdapter: Send + Sync {
    /// Registry name of the provider (used in `/webhooks/{provider}`).
    fn name(&self) -> &str;

    /// Endpoint the adapter sends to, for diagnostics.
    fn send_endpoint(&self) -> &str;

    /// Checks the inbound webhook credential carried in the
    /// `Authorization` header.
    fn verify_request(&self, authorization: Option<&str>) -> Result<(), ChipError>;

    /// Converts a raw webhook body into the canonical event shape.
    fn normalize_event(&self, body: &Value) -> Result<NormalizedEvent, ChipError>;

    /// Validates and delivers a message through the provider.
    async fn send_message(&self, message: &OutboundMessage) -> Result<SendResult, ChipError>;
}

// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging adapter for deterministic testing.
//!
//! `MockAdapter` normalizes webhooks exactly like the LoopMessage adapter
//! but captures outbound messages instead of calling a provider.

use std::sync::Arc;

use async_trait::async_trait;
use chip_core::auth::verify_bearer;
use chip_core::{ChipError, MessagingAdapter, NormalizedEvent, OutboundMessage, SendResult};
use serde_json::Value;
use tokio::sync::Mutex;

type ErrorFactory = Box<dyn Fn() -> ChipError + Send + Sync>;

/// A mock messaging provider for testing.
///
/// Every message passed to `send_message()` is validated and captured,
/// whether or not a failure has been configured.
pub struct MockAdapter {
    name: String,
    webhook_secret: Option<String>,
    failure: Option<ErrorFactory>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl MockAdapter {
    /// Create a mock registered as `loop`, without webhook verification.
    pub fn new() -> Self {
        Self::named(chip_loop::PROVIDER_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            webhook_secret: None,
            failure: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Require `Authorization: Bearer <secret>` on inbound webhooks.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Make every send fail with the error produced by `failure`.
    pub fn failing_with(mut self, failure: impl Fn() -> ChipError + Send + Sync + 'static) -> Self {
        self.failure = Some(Box::new(failure));
        self
    }

    /// Get all messages that were passed to `send_message()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Text bodies of the captured text messages, in send order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_endpoint(&self) -> &str {
        "mock://send"
    }

    fn verify_request(&self, authorization: Option<&str>) -> Result<(), ChipError> {
        verify_bearer(self.webhook_secret.as_deref(), authorization)
    }

    fn normalize_event(&self, body: &Value) -> Result<NormalizedEvent, ChipError> {
        Ok(chip_loop::normalize::normalize(body))
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<SendResult, ChipError> {
        message.validate()?;
        let mut sent = self.sent.lock().await;
        sent.push(message.clone());
        if let Some(failure) = &self.failure {
            return Err(failure());
        }
        Ok(SendResult {
            message_id: Some(format!("mock-{}", sent.len())),
            ok: Some(true),
            data: None,
        })
    }
}

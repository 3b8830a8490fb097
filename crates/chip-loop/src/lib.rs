// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LoopMessage adapter for the Chip messaging agent.
//!
//! Sends iMessage (and SMS fallback) messages through the LoopMessage REST
//! API and normalizes its inbound webhooks. Requests carry both the
//! `Authorization` and `Loop-Secret-Key` headers.

pub mod normalize;
pub mod payload;

use std::time::Duration;

use async_trait::async_trait;
use chip_config::model::LoopConfig;
use chip_core::auth::verify_bearer;
use chip_core::{ChipError, MessagingAdapter, NormalizedEvent, OutboundMessage, SendResult};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::payload::{PayloadDefaults, build_payload};

/// Registry name of this adapter.
pub const PROVIDER_NAME: &str = "loop";

/// LoopMessage implementation of [`MessagingAdapter`].
pub struct LoopAdapter {
    client: reqwest::Client,
    config: LoopConfig,
}

impl LoopAdapter {
    /// Builds the adapter. Missing credentials are tolerated here and
    /// reported by [`send_message`](MessagingAdapter::send_message), so the
    /// webhook side keeps working without them.
    pub fn new(config: LoopConfig) -> Result<Self, ChipError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChipError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn headers(&self) -> Result<HeaderMap, ChipError> {
        let (Some(authorization), Some(secret_key)) = (
            self.config.authorization.as_deref().filter(|s| !s.is_empty()),
            self.config.secret_key.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(ChipError::Config(
                "loop.authorization and loop.secret_key must be set to send messages".into(),
            ));
        };

        let value = |raw: &str, name: &str| {
            HeaderValue::from_str(raw)
                .map_err(|e| ChipError::Config(format!("invalid {name} header value: {e}")))
        };

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", value(authorization, "Authorization")?);
        headers.insert("Loop-Secret-Key", value(secret_key, "Loop-Secret-Key")?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn payload_defaults(&self) -> PayloadDefaults<'_> {
        PayloadDefaults {
            sender_name: self.config.sender_name.as_deref(),
            status_callback: self.config.status_callback_url.as_deref(),
            status_callback_header: self.config.status_callback_auth.as_deref(),
        }
    }
}

impl std::fmt::Debug for LoopAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessagingAdapter for LoopAdapter {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn send_endpoint(&self) -> &str {
        &self.config.send_url
    }

    fn verify_request(&self, authorization: Option<&str>) -> Result<(), ChipError> {
        verify_bearer(self.config.webhook_auth.as_deref(), authorization)
    }

    fn normalize_event(&self, body: &Value) -> Result<NormalizedEvent, ChipError> {
        Ok(normalize::normalize(body))
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<SendResult, ChipError> {
        let headers = self.headers()?;
        message.validate()?;
        let payload = build_payload(message, &self.payload_defaults());

        debug!(
            provider = PROVIDER_NAME,
            message_type = %message.message_type(),
            "sending message"
        );

        let response = self
            .client
            .post(&self.config.send_url)
            .headers(headers)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChipError::Timeout {
                        duration: Duration::from_secs(self.config.timeout_secs),
                    }
                } else {
                    ChipError::send(format!("LoopMessage request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let data = serde_json::from_str::<Value>(&body).ok();

        if !status.is_success() {
            warn!(provider = PROVIDER_NAME, status = %status, body = %body, "LoopMessage API error");
            return Err(ChipError::Send {
                message: format!("LoopMessage returned {status}"),
                status: Some(status.as_u16()),
                detail: Some(data.unwrap_or(Value::String(body))),
            });
        }

        let object = data.filter(Value::is_object);
        let result = SendResult {
            message_id: object
                .as_ref()
                .and_then(|d| d.get("message_id"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            ok: object.as_ref().and_then(|d| d.get("ok")).and_then(Value::as_bool),
            data: object,
        };
        debug!(provider = PROVIDER_NAME, message_id = ?result.message_id, "message accepted");
        Ok(result)
    }
}

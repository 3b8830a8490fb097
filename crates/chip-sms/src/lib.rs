// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio SMS adapter for the Chip messaging agent.
//!
//! Outbound messages use the Messages REST resource with form-encoded
//! bodies and HTTP Basic auth (`account_sid:auth_token`). SMS carries
//! plain text and optional media URLs only.

use std::time::Duration;

use async_trait::async_trait;
use chip_config::model::TwilioConfig;
use chip_core::auth::verify_bearer;
use chip_core::normalize::{FieldRule, extract, fallback_text};
use chip_core::{
    ChipError, MessageType, MessagingAdapter, NormalizedEvent, OutboundMessage, SendResult,
};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

/// Registry name of this adapter.
pub const PROVIDER_NAME: &str = "twilio";

/// Message statuses Twilio reports for an accepted send.
const ACCEPTED_STATUSES: &[&str] = &["queued", "sending", "sent"];

const TEXT: &[FieldRule] = &[FieldRule::lossy(&["Body"]), FieldRule::lossy(&["text"])];
const RECIPIENT: &[FieldRule] = &[FieldRule::strict(&["From"]), FieldRule::address(&["from"])];
const MESSAGE_ID: &[FieldRule] = &[
    FieldRule::strict(&["MessageSid"]),
    FieldRule::strict(&["message_id"]),
];
const ALERT_TYPE: &[FieldRule] = &[
    FieldRule::strict(&["SmsStatus"]),
    FieldRule::strict(&["event"]),
];

/// Twilio implementation of [`MessagingAdapter`].
pub struct TwilioAdapter {
    client: reqwest::Client,
    config: TwilioConfig,
    send_url: String,
}

impl TwilioAdapter {
    pub fn new(config: TwilioConfig) -> Result<Self, ChipError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChipError::Config(format!("failed to build HTTP client: {e}")))?;
        let send_url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base.trim_end_matches('/'),
            config.account_sid.as_deref().unwrap_or_default()
        );
        Ok(Self {
            client,
            config,
            send_url,
        })
    }

    fn credentials(&self) -> Result<(&str, &str, &str), ChipError> {
        let (Some(account_sid), Some(auth_token)) =
            (present(&self.config.account_sid), present(&self.config.auth_token))
        else {
            return Err(ChipError::Config(
                "twilio.account_sid and twilio.auth_token must be set to send messages".into(),
            ));
        };
        let Some(from) = present(&self.config.from_number) else {
            return Err(ChipError::Config(
                "twilio.from_number must be set to send messages".into(),
            ));
        };
        Ok((account_sid, auth_token, from))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl std::fmt::Debug for TwilioAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Form fields for a text message. Group targets and non-text kinds are
/// rejected because SMS cannot express them.
fn form_fields<'a>(
    message: &'a OutboundMessage,
    from: &'a str,
) -> Result<Vec<(&'static str, &'a str)>, ChipError> {
    let OutboundMessage::Text(text) = message else {
        return Err(ChipError::Validation(format!(
            "Twilio SMS only supports text messages, got {}",
            message.message_type()
        )));
    };
    let Some(to) = text.envelope.recipient.as_deref() else {
        return Err(ChipError::Validation(
            "Twilio SMS requires a recipient phone number".into(),
        ));
    };

    let mut fields = vec![("To", to), ("From", from), ("Body", text.text.as_str())];
    fields.extend(text.attachments.iter().map(|url| ("MediaUrl", url.as_str())));
    Ok(fields)
}

#[async_trait]
impl MessagingAdapter for TwilioAdapter {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn send_endpoint(&self) -> &str {
        &self.send_url
    }

    fn verify_request(&self, authorization: Option<&str>) -> Result<(), ChipError> {
        verify_bearer(self.config.webhook_secret.as_deref(), authorization)
    }

    fn normalize_event(&self, body: &Value) -> Result<NormalizedEvent, ChipError> {
        if !body.is_object() {
            return Ok(NormalizedEvent::text_only(fallback_text(body)));
        }

        let text = extract(body, TEXT).unwrap_or_default();
        let num_media = extract(body, &[FieldRule::lossy(&["NumMedia"])])
            .and_then(|n| n.trim().parse::<u32>().ok())
            .unwrap_or(0);
        let message_type = (num_media > 0 && text.trim().is_empty()).then_some(MessageType::Attachments);

        Ok(NormalizedEvent {
            alert_type: extract(body, ALERT_TYPE),
            text,
            recipient: extract(body, RECIPIENT),
            message_id: extract(body, MESSAGE_ID),
            group_id: None,
            message_type,
            reaction: None,
        })
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<SendResult, ChipError> {
        let (account_sid, auth_token, from) = self.credentials()?;
        message.validate()?;
        let fields = form_fields(message, from)?;
        let form = serde_urlencoded::to_string(&fields)
            .map_err(|e| ChipError::Internal(format!("failed to encode form: {e}")))?;

        debug!(provider = PROVIDER_NAME, "sending SMS");

        let response = self
            .client
            .post(&self.send_url)
            .basic_auth(account_sid, Some(auth_token))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChipError::Timeout {
                        duration: Duration::from_secs(self.config.timeout_secs),
                    }
                } else {
                    ChipError::send(format!("Twilio request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let data = serde_json::from_str::<Value>(&body).ok();

        if !status.is_success() {
            warn!(provider = PROVIDER_NAME, status = %status, body = %body, "Twilio API error");
            return Err(ChipError::Send {
                message: format!("Twilio returned {status}"),
                status: Some(status.as_u16()),
                detail: Some(data.unwrap_or(Value::String(body))),
            });
        }

        let data = data.filter(Value::is_object);
        let field = |key: &str| {
            data.as_ref()
                .and_then(|d| d.get(key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let message_status = field("status").unwrap_or_default();
        Ok(SendResult {
            message_id: field("sid"),
            ok: Some(ACCEPTED_STATUSES.contains(&message_status.as_str())),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use chip_core::{AudioMessage, Envelope, TextMessage};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(api_base: String) -> TwilioConfig {
        TwilioConfig {
            enabled: true,
            account_sid: Some("AC123".into()),
            auth_token: Some("token".into()),
            from_number: Some("+15550000000".into()),
            webhook_secret: None,
            api_base,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn sends_form_encoded_sms() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("To=%2B15551234567"))
            .and(body_string_contains("From=%2B15550000000"))
            .and(body_string_contains("Body=Hello+there"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"sid": "SM1", "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let adapter = TwilioAdapter::new(config(server.uri())).unwrap();
        let msg = OutboundMessage::text_to("+15551234567", "Hello there").unwrap();
        let result = adapter.send_message(&msg).await.unwrap();
        assert_eq!(result.message_id.as_deref(), Some("SM1"));
        assert_eq!(result.ok, Some(true));
    }

    #[tokio::test]
    async fn failed_status_reports_not_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"sid": "SM2", "status": "failed"})),
            )
            .mount(&server)
            .await;

        let adapter = TwilioAdapter::new(config(server.uri())).unwrap();
        let msg = OutboundMessage::text_to("+15551234567", "Hi").unwrap();
        let result = adapter.send_message(&msg).await.unwrap();
        assert_eq!(result.ok, Some(false));
    }

    #[tokio::test]
    async fn http_error_becomes_send_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 21610,
                "message": "Attempt to send to unsubscribed recipient"
            })))
            .mount(&server)
            .await;

        let adapter = TwilioAdapter::new(config(server.uri())).unwrap();
        let msg = OutboundMessage::text_to("+15551234567", "Hi").unwrap();
        let err = adapter.send_message(&msg).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
        assert!(err.is_recipient_unreachable());
    }

    #[tokio::test]
    async fn rejects_non_text_and_group_targets() {
        let server = MockServer::start().await;
        let adapter = TwilioAdapter::new(config(server.uri())).unwrap();

        let audio = AudioMessage::new(Envelope::to("+1555"), "https://x.io/a.m4a")
            .build()
            .unwrap();
        assert!(matches!(
            adapter.send_message(&audio).await,
            Err(ChipError::Validation(_))
        ));

        let group = TextMessage::new(Envelope::group("g1"), "hi").build().unwrap();
        assert!(matches!(
            adapter.send_message(&group).await,
            Err(ChipError::Validation(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_from_number_is_config_error() {
        let mut cfg = config("https://api.twilio.com".into());
        cfg.from_number = None;
        let adapter = TwilioAdapter::new(cfg).unwrap();
        let msg = OutboundMessage::text_to("+1555", "hi").unwrap();
        let err = adapter.send_message(&msg).await.unwrap_err();
        assert!(err.to_string().contains("from_number"));
    }

    #[test]
    fn attachments_become_media_urls() {
        let msg = TextMessage::new(Envelope::to("+1555"), "look")
            .with_attachment("https://x.io/a.png")
            .with_attachment("https://x.io/b.png")
            .build()
            .unwrap();
        let fields = form_fields(&msg, "+1000").unwrap();
        let media: Vec<_> = fields.iter().filter(|(k, _)| *k == "MediaUrl").collect();
        assert_eq!(media.len(), 2);
    }

    #[test]
    fn normalizes_form_webhook() {
        let adapter = TwilioAdapter::new(config("https://api.twilio.com".into())).unwrap();
        let event = adapter
            .normalize_event(&json!({
                "Body": "Any internships?",
                "From": "+15551234567",
                "MessageSid": "SM9",
                "SmsStatus": "received",
                "NumMedia": "0"
            }))
            .unwrap();
        assert_eq!(event.text, "Any internships?");
        assert_eq!(event.recipient.as_deref(), Some("+15551234567"));
        assert_eq!(event.message_id.as_deref(), Some("SM9"));
        assert_eq!(event.alert_type.as_deref(), Some("received"));
        assert!(event.message_type.is_none());
    }

    #[test]
    fn normalizes_json_test_shape_and_media_only() {
        let adapter = TwilioAdapter::new(config("https://api.twilio.com".into())).unwrap();
        let event = adapter
            .normalize_event(&json!({
                "text": "hi",
                "from": {"address": "+1555"},
                "message_id": "t1",
                "event": "message_inbound"
            }))
            .unwrap();
        assert_eq!(event.recipient.as_deref(), Some("+1555"));
        assert_eq!(event.alert_type.as_deref(), Some("message_inbound"));

        let media = adapter
            .normalize_event(&json!({"From": "+1555", "NumMedia": "2", "Body": ""}))
            .unwrap();
        assert_eq!(media.message_type, Some(MessageType::Attachments));
        assert_eq!(media.text, "");

        let garbage = adapter.normalize_event(&json!(["x"])).unwrap();
        assert!(garbage.recipient.is_none());
    }

    #[test]
    fn send_endpoint_includes_account() {
        let adapter = TwilioAdapter::new(config("https://api.twilio.com/".into())).unwrap();
        assert_eq!(
            adapter.send_endpoint(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}

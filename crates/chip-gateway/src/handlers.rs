// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles POST {prefix}/webhooks/{provider}, POST {prefix}/messages/send,
//! POST {prefix}/test/agent, and GET {prefix}/health (also `/healthz`).

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chip_core::{ChipError, OutboundMessage, SendResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::server::GatewayState;

/// Request body for POST /messages/send.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    /// Registry name; defaults to `server.default_provider`.
    #[serde(default)]
    pub provider: Option<String>,
    pub message: OutboundMessage,
}

/// Response body for a successful POST /messages/send.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub ok: bool,
    pub result: SendResult,
}

/// Request body for POST /test/agent.
#[derive(Debug, Deserialize)]
pub struct AgentTestRequest {
    pub message: String,
}

/// Response body for POST /test/agent.
#[derive(Debug, Serialize)]
pub struct AgentTestResponse {
    pub ok: bool,
    pub reply: String,
    pub submission_detected: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub providers: Vec<String>,
}

/// POST /webhooks/{provider}
///
/// Every delivery that passes verification gets `200 {ok: true, ...}`.
/// Unknown providers are 404, rejected credentials 401.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let adapter = match state.registry.get(&provider) {
        Ok(adapter) => adapter,
        Err(e) => return error_response(&e),
    };

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let payload = decode_webhook_body(&headers, &body);
    debug!(provider = %provider, bytes = body.len(), "webhook received");

    match state.pipeline.handle(adapter.as_ref(), authorization, &payload).await {
        Ok(outcome) => Json(outcome.to_json()).into_response(),
        Err(e) => {
            warn!(provider = %provider, error = %e, "webhook rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"ok": false, "error": "Unauthorized webhook"})),
            )
                .into_response()
        }
    }
}

/// POST /messages/send
///
/// Malformed or invalid messages are 400, unknown providers 404, provider
/// failures 502.
pub async fn post_send_message(State(state): State<GatewayState>, body: Bytes) -> Response {
    let request: SendMessageRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(&ChipError::Validation(e.to_string()));
        }
    };

    let provider = request
        .provider
        .unwrap_or_else(|| state.default_provider.clone());
    let adapter = match state.registry.get(&provider) {
        Ok(adapter) => adapter,
        Err(e) => return error_response(&e),
    };

    match adapter.send_message(&request.message).await {
        Ok(result) => Json(SendMessageResponse { ok: true, result }).into_response(),
        Err(e) => {
            warn!(provider = %provider, error = %e, "outbound send failed");
            error_response(&e)
        }
    }
}

/// POST /test/agent
///
/// Runs context retrieval and reply generation for `message` with no
/// provider involved. Nothing is sent, deduplicated, or recorded.
pub async fn post_test_agent(State(state): State<GatewayState>, body: Bytes) -> Response {
    let request: AgentTestRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return error_response(&ChipError::Validation(e.to_string())),
    };

    match state.pipeline.preview_reply(&request.message).await {
        Ok(reply) => Json(AgentTestResponse {
            ok: true,
            submission_detected: reply.submission.is_some(),
            reply: reply.text,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "agent test failed");
            error_response(&e)
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: state.registry.names(),
    })
}

/// Map a [`ChipError`] to its status code and a JSON error body. Provider
/// detail is passed through for send errors.
pub fn error_response(err: &ChipError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = json!({"ok": false, "error": err.to_string()});
    if let ChipError::Send {
        detail: Some(detail),
        ..
    } = err
    {
        body["detail"] = detail.clone();
    }
    (status, Json(body)).into_response()
}

/// Turn a webhook body into JSON. Form-encoded bodies that are not JSON
/// become a flat object of strings (first value wins); anything else that
/// is not JSON is passed on as a string.
pub fn decode_webhook_body(headers: &HeaderMap, body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    if let Ok(value) = serde_json::from_slice(body) {
        return value;
    }

    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        match serde_urlencoded::from_bytes::<Vec<(String, String)>>(body) {
            Ok(pairs) => {
                let mut object = Map::new();
                for (key, value) in pairs {
                    object.entry(key).or_insert(Value::String(value));
                }
                return Value::Object(object);
            }
            Err(e) => debug!(error = %e, "form body did not parse"),
        }
    }

    Value::String(String::from_utf8_lossy(body).into_owned())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn form_body_becomes_flat_object() {
        let body = b"From=%2B15551234567&Body=Hello+there&MessageSid=SM1&Body=ignored";
        let value = decode_webhook_body(&form_headers(), body);
        assert_eq!(
            value,
            json!({"From": "+15551234567", "Body": "Hello there", "MessageSid": "SM1"})
        );
    }

    #[test]
    fn json_body_is_parsed() {
        let value = decode_webhook_body(&HeaderMap::new(), br#"{"text":"hi"}"#);
        assert_eq!(value, json!({"text": "hi"}));
    }

    #[test]
    fn json_sent_as_form_still_parses() {
        let value = decode_webhook_body(&form_headers(), br#"{"text":"hi"}"#);
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn unparseable_body_is_text() {
        assert_eq!(decode_webhook_body(&HeaderMap::new(), b"plain words"), json!("plain words"));
        assert_eq!(decode_webhook_body(&HeaderMap::new(), b""), Value::Null);
    }

    #[test]
    fn send_errors_carry_detail() {
        let err = ChipError::Send {
            message: "LoopMessage returned 400".into(),
            status: Some(400),
            detail: Some(json!({"code": 280})),
        };
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}

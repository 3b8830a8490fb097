// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Projection of [`OutboundMessage`] into the LoopMessage send payload.

use chip_core::{Envelope, OutboundMessage};
use serde_json::{Map, Value, json};

/// Provider-side minimum for the `timeout` field.
const MIN_TIMEOUT_SECONDS: u32 = 5;

/// Account-level fields added to every request.
#[derive(Debug, Clone, Default)]
pub struct PayloadDefaults<'a> {
    pub sender_name: Option<&'a str>,
    pub status_callback: Option<&'a str>,
    pub status_callback_header: Option<&'a str>,
}

/// Build the JSON body for `message`. Only fields that are set are emitted.
pub fn build_payload(message: &OutboundMessage, defaults: &PayloadDefaults<'_>) -> Map<String, Value> {
    let mut payload = Map::new();
    let mut put = |key: &str, value: Value| {
        payload.insert(key.to_string(), value);
    };

    if let Some(sender) = defaults.sender_name.filter(|s| !s.is_empty()) {
        put("sender_name", json!(sender));
    }

    let Envelope {
        recipient,
        group_id,
        reply_to_id,
        passthrough,
        service,
        timeout_seconds,
    } = message.envelope();

    if let Some(group) = group_id {
        put("group", json!(group));
    } else if let Some(recipient) = recipient {
        put("recipient", json!(recipient));
    }

    if let Some(url) = defaults.status_callback.filter(|s| !s.is_empty()) {
        put("status_callback", json!(url));
    }
    if let Some(header) = defaults.status_callback_header.filter(|s| !s.is_empty()) {
        put("status_callback_header", json!(header));
    }
    if let Some(passthrough) = passthrough {
        put("passthrough", json!(passthrough));
    }
    if let Some(service) = service {
        put("service", json!(service.to_string()));
    }
    if let Some(timeout) = timeout_seconds.filter(|t| *t >= MIN_TIMEOUT_SECONDS) {
        put("timeout", json!(timeout));
    }

    match message {
        OutboundMessage::Text(text) => {
            if let Some(reply_to) = reply_to_id {
                put("reply_to_id", json!(reply_to));
            }
            put("text", json!(text.text));
            if !text.attachments.is_empty() {
                put("attachments", json!(text.attachments));
            }
            if let Some(subject) = &text.subject {
                put("subject", json!(subject));
            }
            if let Some(effect) = text.effect {
                put("effect", json!(effect.to_string()));
            }
        }
        // The reaction target travels as `message_id`; `reply_to_id` is never sent.
        OutboundMessage::Reaction(reaction) => {
            put("reaction", json!(reaction.reaction.to_string()));
            put("message_id", json!(reaction.target_message_id));
        }
        OutboundMessage::Audio(audio) => {
            if let Some(reply_to) = reply_to_id {
                put("reply_to_id", json!(reply_to));
            }
            put("media_url", json!(audio.media_url));
            if let Some(caption) = &audio.text {
                put("text", json!(caption));
            }
        }
    }

    payload
}

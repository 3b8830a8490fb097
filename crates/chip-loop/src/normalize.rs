// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook normalization for LoopMessage.
//!
//! Two payload shapes are accepted. A body with a truthy `alert_type` is a
//! native LoopMessage webhook; anything else is read as the wrapped
//! `{event, data: {message: {...}}}` envelope used by internal tooling.

use chip_core::normalize::{FieldRule, extract, fallback_text, is_truthy, parse_enum};
use chip_core::{MessageType, NormalizedEvent, ReactionType};
use serde_json::Value;

mod native {
    use super::FieldRule;

    pub const ALERT_TYPE: &[FieldRule] = &[FieldRule::lossy(&["alert_type"])];
    pub const TEXT: &[FieldRule] = &[
        FieldRule::lossy(&["text"]),
        FieldRule::lossy(&["content"]),
        FieldRule::lossy(&["message"]),
    ];
    pub const RECIPIENT: &[FieldRule] = &[
        FieldRule::address(&["recipient"]),
        FieldRule::address(&["from"]),
    ];
    pub const MESSAGE_ID: &[FieldRule] = &[
        FieldRule::strict(&["message_id"]),
        FieldRule::strict(&["id"]),
    ];
    pub const GROUP_ID: &[FieldRule] = &[
        FieldRule::strict(&["group", "group_id"]),
        FieldRule::strict(&["group"]),
    ];
}

mod wrapped {
    use super::FieldRule;

    pub const ALERT_TYPE: &[FieldRule] = &[
        FieldRule::lossy(&["event"]),
        FieldRule::lossy(&["alert_type"]),
    ];
    pub const TEXT: &[FieldRule] = &[
        FieldRule::lossy(&["data", "message", "text"]),
        FieldRule::lossy(&["data", "text"]),
        FieldRule::lossy(&["text"]),
    ];
    pub const RECIPIENT: &[FieldRule] = &[
        FieldRule::address(&["data", "message", "from"]),
        FieldRule::strict(&["data", "from"]),
        FieldRule::strict(&["from"]),
    ];
    pub const MESSAGE_ID: &[FieldRule] = &[
        FieldRule::strict(&["data", "message", "id"]),
        FieldRule::strict(&["data", "id"]),
        FieldRule::strict(&["id"]),
    ];
    pub const GROUP_ID: &[FieldRule] = &[
        FieldRule::strict(&["data", "conversationId"]),
        FieldRule::strict(&["data", "group_id"]),
        FieldRule::strict(&["group_id"]),
    ];
}

/// Normalize a LoopMessage webhook body. Never fails.
pub fn normalize(body: &Value) -> NormalizedEvent {
    if !body.is_object() {
        return NormalizedEvent::text_only(fallback_text(body));
    }

    let is_native = body.get("alert_type").is_some_and(is_truthy);
    if is_native {
        NormalizedEvent {
            alert_type: extract(body, native::ALERT_TYPE),
            text: extract(body, native::TEXT).unwrap_or_default(),
            recipient: extract(body, native::RECIPIENT),
            message_id: extract(body, native::MESSAGE_ID),
            group_id: extract(body, native::GROUP_ID),
            message_type: parse_enum::<MessageType>(body.get("message_type")),
            reaction: parse_enum::<ReactionType>(body.get("reaction")),
        }
    } else {
        NormalizedEvent {
            alert_type: extract(body, wrapped::ALERT_TYPE),
            text: extract(body, wrapped::TEXT).unwrap_or_default(),
            recipient: extract(body, wrapped::RECIPIENT),
            message_id: extract(body, wrapped::MESSAGE_ID),
            group_id: extract(body, wrapped::GROUP_ID),
            message_type: None,
            reaction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn native_inbound_text() {
        let event = normalize(&json!({
            "alert_type": "message_inbound",
            "text": "Hi Chip!",
            "recipient": "+15551234567",
            "message_id": "in-1",
            "message_type": "text"
        }));
        assert_eq!(event.alert_type.as_deref(), Some("message_inbound"));
        assert_eq!(event.text, "Hi Chip!");
        assert_eq!(event.recipient.as_deref(), Some("+15551234567"));
        assert_eq!(event.message_id.as_deref(), Some("in-1"));
        assert_eq!(event.message_type, Some(MessageType::Text));
        assert!(event.group_id.is_none());
    }

    #[test]
    fn native_fallback_keys() {
        let event = normalize(&json!({
            "alert_type": "message_inbound",
            "content": "from content",
            "from": {"address": "user@example.com"},
            "id": "m-9",
            "group": {"group_id": "grp-1"}
        }));
        assert_eq!(event.text, "from content");
        assert_eq!(event.recipient.as_deref(), Some("user@example.com"));
        assert_eq!(event.message_id.as_deref(), Some("m-9"));
        assert_eq!(event.group_id.as_deref(), Some("grp-1"));
    }

    #[test]
    fn native_reaction_and_unknown_enums() {
        let event = normalize(&json!({
            "alert_type": "message_reaction",
            "message_type": "REACTION",
            "reaction": "Love",
            "group": "grp-2"
        }));
        assert_eq!(event.message_type, Some(MessageType::Reaction));
        assert_eq!(event.reaction, Some(ReactionType::Love));
        assert_eq!(event.group_id.as_deref(), Some("grp-2"));

        let event = normalize(&json!({
            "alert_type": "message_inbound",
            "message_type": "hologram",
            "reaction": 5
        }));
        assert!(event.message_type.is_none());
        assert!(event.reaction.is_none());
    }

    #[test]
    fn native_type_mismatches_drop_fields() {
        let event = normalize(&json!({
            "alert_type": "message_inbound",
            "text": 123,
            "recipient": 42,
            "message_id": ["x"]
        }));
        assert_eq!(event.text, "123");
        assert!(event.recipient.is_none());
        assert!(event.message_id.is_none());
    }

    #[test]
    fn wrapped_internal_shape() {
        let event = normalize(&json!({
            "event": "message.created",
            "data": {
                "conversationId": "c1",
                "message": {"id": "m1", "text": "Hello", "from": {"address": "+15550001111"}}
            }
        }));
        assert_eq!(event.alert_type.as_deref(), Some("message.created"));
        assert_eq!(event.text, "Hello");
        assert_eq!(event.recipient.as_deref(), Some("+15550001111"));
        assert_eq!(event.message_id.as_deref(), Some("m1"));
        assert_eq!(event.group_id.as_deref(), Some("c1"));
        assert!(event.message_type.is_none());
    }

    #[test]
    fn wrapped_falls_back_to_outer_keys() {
        let event = normalize(&json!({
            "data": "garbage",
            "text": "outer",
            "from": "+1555",
            "id": "outer-id",
            "group_id": "g"
        }));
        assert!(event.alert_type.is_none());
        assert_eq!(event.text, "outer");
        assert_eq!(event.recipient.as_deref(), Some("+1555"));
        assert_eq!(event.message_id.as_deref(), Some("outer-id"));
        assert_eq!(event.group_id.as_deref(), Some("g"));
    }

    #[test]
    fn empty_alert_type_uses_wrapped_shape() {
        let event = normalize(&json!({"alert_type": "", "text": "x", "recipient": "+1"}));
        assert_eq!(event.text, "x");
        // `recipient` is not a wrapped-shape key.
        assert!(event.recipient.is_none());
    }

    #[test]
    fn non_object_bodies() {
        assert_eq!(normalize(&Value::Null), NormalizedEvent::default());
        assert_eq!(normalize(&json!("just text")).text, "just text");
        assert_eq!(normalize(&json!(17)).text, "17");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9_ +@.-]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            let keys = prop_oneof![
                Just("alert_type".to_string()),
                Just("text".to_string()),
                Just("recipient".to_string()),
                Just("from".to_string()),
                Just("data".to_string()),
                Just("message".to_string()),
                Just("group".to_string()),
                Just("message_type".to_string()),
                Just("reaction".to_string()),
                "[a-z]{1,6}",
            ];
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map(keys, inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn never_panics_and_text_is_a_string(body in arb_json()) {
            let event = normalize(&body);
            // Re-serializing proves every field is present and well-formed.
            let value = serde_json::to_value(&event).unwrap();
            prop_assert!(value["text"].is_string());
        }
    }
}

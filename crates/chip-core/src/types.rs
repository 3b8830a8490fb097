// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by adapters, the webhook pipeline, and the HTTP API.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Delivery channel preference for outbound messages.
///
/// Providers that support more than one transport (Loop can send via
/// iMessage or SMS) treat this as a hint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ServiceType {
    /// Apple iMessage.
    #[serde(rename = "imessage")]
    #[strum(serialize = "imessage")]
    IMessage,
    /// Carrier SMS/MMS.
    Sms,
}

/// Tapback reactions, including the `-` prefixed removal variants.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ReactionType {
    #[serde(rename = "love")]
    #[strum(serialize = "love")]
    Love,
    #[serde(rename = "like")]
    #[strum(serialize = "like")]
    Like,
    #[serde(rename = "dislike")]
    #[strum(serialize = "dislike")]
    Dislike,
    #[serde(rename = "laugh")]
    #[strum(serialize = "laugh")]
    Laugh,
    #[serde(rename = "exclaim")]
    #[strum(serialize = "exclaim")]
    Exclaim,
    #[serde(rename = "question")]
    #[strum(serialize = "question")]
    Question,
    #[serde(rename = "-love")]
    #[strum(serialize = "-love")]
    LoveRemove,
    #[serde(rename = "-like")]
    #[strum(serialize = "-like")]
    LikeRemove,
    #[serde(rename = "-dislike")]
    #[strum(serialize = "-dislike")]
    DislikeRemove,
    #[serde(rename = "-laugh")]
    #[strum(serialize = "-laugh")]
    LaughRemove,
    #[serde(rename = "-exclaim")]
    #[strum(serialize = "-exclaim")]
    ExclaimRemove,
    #[serde(rename = "-question")]
    #[strum(serialize = "-question")]
    QuestionRemove,
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl ReactionType {
    /// Whether this reaction removes a previously applied tapback.
    pub fn is_removal(&self) -> bool {
        self.to_string().starts_with('-')
    }
}

/// High-level classification of inbound and outbound messages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MessageType {
    Text,
    Reaction,
    Audio,
    Attachments,
    Sticker,
    Location,
}

/// iMessage bubble and screen effects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Effect {
    Slam,
    Loud,
    Gentle,
    InvisibleInk,
    Echo,
    Spotlight,
    Balloons,
    Confetti,
    Love,
    Lasers,
    Fireworks,
    ShootingStar,
    Celebration,
}

/// Adapter-agnostic inbound event.
///
/// Every field is always present: absent data is `None` (or the empty string
/// for `text`), so consumers only ever null-test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Provider event name (e.g. `message_inbound`).
    pub alert_type: Option<String>,
    /// Plain text content. Never null.
    pub text: String,
    /// Address of the user who wrote the message (phone or email).
    pub recipient: Option<String>,
    /// Provider identifier of the inbound message.
    pub message_id: Option<String>,
    /// Group conversation identifier.
    pub group_id: Option<String>,
    /// Message classification, when the provider reports one.
    pub message_type: Option<MessageType>,
    /// Parsed reaction for reaction events.
    pub reaction: Option<ReactionType>,
}

impl NormalizedEvent {
    /// Event carrying only best-effort text, used for non-object payloads.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Result returned by adapters after a send attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendResult {
    /// Provider-assigned identifier of the outbound message.
    pub message_id: Option<String>,
    /// Provider success flag, when the provider reports one.
    pub ok: Option<bool>,
    /// Raw provider response for diagnostics.
    pub data: Option<serde_json::Value>,
}

/// Opaque identifier of a community member, resolved from a phone/email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of a reply generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    /// Present when the user's message was recognised as a challenge submission.
    pub submission: Option<SubmissionDraft>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            submission: None,
        }
    }
}

/// A challenge submission detected in a user message, not yet recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub challenge_id: String,
    pub submission_text: String,
    pub submission_url: Option<String>,
}

/// A submission persisted by a [`SubmissionRecorder`](crate::SubmissionRecorder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub user_id: UserId,
    pub challenge_id: String,
    pub submission_text: String,
    pub submission_url: Option<String>,
}

// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-agnostic outbound message model.
//!
//! [`OutboundMessage`] is a tagged sum over text, reaction, and audio
//! messages. Every variant shares an [`Envelope`] carrying the target and
//! delivery options. Validation happens when a message is built or
//! deserialized, so adapters only ever see messages that passed it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ChipError;
use crate::types::{Effect, MessageType, ReactionType, ServiceType};

/// Maximum number of attachments on a single text message.
pub const MAX_ATTACHMENTS: usize = 3;

/// Maximum length of an attachment URL.
pub const MAX_ATTACHMENT_URL_LEN: usize = 256;

/// Image extensions accepted for attachments.
pub const ATTACHMENT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Target and delivery options shared by every outbound message kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Phone number or email of a single recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Group conversation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Provider id of the message being replied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    /// Opaque correlation token echoed back by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<String>,
    /// Channel hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceType>,
    /// Provider-side delivery timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
}

impl Envelope {
    /// Envelope addressed to a single recipient.
    pub fn to(recipient: impl Into<String>) -> Self {
        Self {
            recipient: Some(recipient.into()),
            ..Self::default()
        }
    }

    /// Envelope addressed to a group conversation.
    pub fn group(group_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            ..Self::default()
        }
    }

    /// Exactly one of `recipient` and `group_id` must be set.
    pub fn ensure_valid_target(&self) -> Result<(), ChipError> {
        let has_recipient = self.recipient.as_deref().is_some_and(|r| !r.is_empty());
        let has_group = self.group_id.as_deref().is_some_and(|g| !g.is_empty());
        match (has_recipient, has_group) {
            (true, false) | (false, true) => Ok(()),
            (false, false) => Err(ChipError::Validation(
                "either recipient or group_id must be set".into(),
            )),
            (true, true) => Err(ChipError::Validation(
                "recipient and group_id are mutually exclusive".into(),
            )),
        }
    }

    /// Whether the message is pinned to the SMS channel.
    pub fn is_sms(&self) -> bool {
        self.service == Some(ServiceType::Sms)
    }
}

/// Plain text message with optional iMessage extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub text: String,
    /// Bold header line (iMessage only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

impl TextMessage {
    pub fn new(envelope: Envelope, text: impl Into<String>) -> Self {
        Self {
            envelope,
            text: text.into(),
            subject: None,
            attachments: Vec::new(),
            effect: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachments.push(url.into());
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Validate and wrap into an [`OutboundMessage`].
    pub fn build(self) -> Result<OutboundMessage, ChipError> {
        let message = OutboundMessage::Text(self);
        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), ChipError> {
        if self.text.trim().is_empty() {
            return Err(ChipError::Validation("text must not be empty".into()));
        }

        if self.attachments.len() > MAX_ATTACHMENTS {
            return Err(ChipError::Validation(format!(
                "at most {MAX_ATTACHMENTS} attachments are allowed, got {}",
                self.attachments.len()
            )));
        }
        for url in &self.attachments {
            validate_attachment_url(url)?;
        }

        if self.envelope.is_sms() {
            let mut unsupported = Vec::new();
            if self.subject.is_some() {
                unsupported.push("subject");
            }
            if self.effect.is_some() {
                unsupported.push("effect");
            }
            if self.envelope.reply_to_id.is_some() {
                unsupported.push("reply_to_id");
            }
            if !unsupported.is_empty() {
                return Err(ChipError::Validation(format!(
                    "SMS does not support {}",
                    unsupported.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Tapback on a previously delivered message. iMessage only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionMessage {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub reaction: ReactionType,
    pub target_message_id: String,
}

impl ReactionMessage {
    pub fn new(
        envelope: Envelope,
        reaction: ReactionType,
        target_message_id: impl Into<String>,
    ) -> Self {
        Self {
            envelope,
            reaction,
            target_message_id: target_message_id.into(),
        }
    }

    pub fn build(self) -> Result<OutboundMessage, ChipError> {
        let message = OutboundMessage::Reaction(self);
        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), ChipError> {
        if self.envelope.is_sms() {
            return Err(ChipError::Validation(
                "reactions are not supported over SMS".into(),
            ));
        }
        if self.target_message_id.trim().is_empty() {
            return Err(ChipError::Validation(
                "target_message_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Voice memo with an optional caption. iMessage only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMessage {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub media_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl AudioMessage {
    pub fn new(envelope: Envelope, media_url: impl Into<String>) -> Self {
        Self {
            envelope,
            media_url: media_url.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn build(self) -> Result<OutboundMessage, ChipError> {
        let message = OutboundMessage::Audio(self);
        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), ChipError> {
        if self.envelope.is_sms() {
            return Err(ChipError::Validation(
                "audio messages are not supported over SMS".into(),
            ));
        }
        if !is_https(&self.media_url) {
            return Err(ChipError::Validation(format!(
                "media_url must be an https URL: {}",
                self.media_url
            )));
        }
        Ok(())
    }
}

/// A validated outbound message.
///
/// Deserialization runs the same validation as the builders, so a
/// malformed API request fails before reaching any adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "message_type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text(TextMessage),
    Reaction(ReactionMessage),
    Audio(AudioMessage),
}

impl OutboundMessage {
    /// Shorthand for a plain text reply to a single recipient.
    pub fn text_to(recipient: impl Into<String>, text: impl Into<String>) -> Result<Self, ChipError> {
        TextMessage::new(Envelope::to(recipient), text).build()
    }

    pub fn envelope(&self) -> &Envelope {
        match self {
            OutboundMessage::Text(m) => &m.envelope,
            OutboundMessage::Reaction(m) => &m.envelope,
            OutboundMessage::Audio(m) => &m.envelope,
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            OutboundMessage::Text(_) => MessageType::Text,
            OutboundMessage::Reaction(_) => MessageType::Reaction,
            OutboundMessage::Audio(_) => MessageType::Audio,
        }
    }

    /// Target check plus the per-variant capability rules.
    pub fn validate(&self) -> Result<(), ChipError> {
        self.envelope().ensure_valid_target()?;
        match self {
            OutboundMessage::Text(m) => m.validate(),
            OutboundMessage::Reaction(m) => m.validate(),
            OutboundMessage::Audio(m) => m.validate(),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "message_type", rename_all = "lowercase")]
enum UncheckedMessage {
    Text(TextMessage),
    Reaction(ReactionMessage),
    Audio(AudioMessage),
}

impl<'de> Deserialize<'de> for OutboundMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let message = match UncheckedMessage::deserialize(deserializer)? {
            UncheckedMessage::Text(m) => OutboundMessage::Text(m),
            UncheckedMessage::Reaction(m) => OutboundMessage::Reaction(m),
            UncheckedMessage::Audio(m) => OutboundMessage::Audio(m),
        };
        message.validate().map_err(serde::de::Error::custom)?;
        Ok(message)
    }
}

fn is_https(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| u.scheme() == "https" && u.host_str().is_some())
}

/// Attachment URLs must be https, short, and point at an image file.
pub fn validate_attachment_url(raw: &str) -> Result<(), ChipError> {
    if raw.chars().count() > MAX_ATTACHMENT_URL_LEN {
        return Err(ChipError::Validation(format!(
            "attachment URL exceeds {MAX_ATTACHMENT_URL_LEN} characters"
        )));
    }

    let parsed = url::Url::parse(raw)
        .map_err(|e| ChipError::Validation(format!("invalid attachment URL {raw}: {e}")))?;
    if parsed.scheme() != "https" {
        return Err(ChipError::Validation(format!(
            "attachment URL must use https: {raw}"
        )));
    }

    let extension = parsed
        .path()
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ATTACHMENT_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ChipError::Validation(format!(
            "attachment must be an image ({}): {raw}",
            ATTACHMENT_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

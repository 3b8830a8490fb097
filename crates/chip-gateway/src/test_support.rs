// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lightweight collaborators for the gateway's unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chip_core::auth::verify_bearer;
use chip_core::{
    ChipError, ContextRetriever, MessagingAdapter, NormalizedEvent, OutboundMessage, Reply,
    ReplyGenerator, SendResult, SubmissionDraft, SubmissionRecord, SubmissionRecorder, UserId,
    UserResolver,
};
use serde_json::Value;

type ErrorFactory = Box<dyn Fn() -> ChipError + Send + Sync>;

/// Adapter that reads events straight from `NormalizedEvent` JSON and
/// records every send.
pub struct RecordingAdapter {
    name: String,
    secret: Option<String>,
    fail_with: Option<ErrorFactory>,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingAdapter {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            secret: None,
            fail_with: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = Some(secret.to_string());
        self
    }

    pub fn failing_with(mut self, error: impl Fn() -> ChipError + Send + Sync + 'static) -> Self {
        self.fail_with = Some(Box::new(error));
        self
    }

    /// `(target, text)` of each text message sent, in order.
    pub fn sent_texts(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::Text(t) => {
                    let target = t.envelope.group_id.clone().or(t.envelope.recipient.clone())?;
                    Some((target, t.text.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessagingAdapter for RecordingAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_endpoint(&self) -> &str {
        "memory://"
    }

    fn verify_request(&self, authorization: Option<&str>) -> Result<(), ChipError> {
        verify_bearer(self.secret.as_deref(), authorization)
    }

    fn normalize_event(&self, body: &Value) -> Result<NormalizedEvent, ChipError> {
        serde_json::from_value(body.clone()).map_err(|e| ChipError::Normalization(e.to_string()))
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<SendResult, ChipError> {
        message.validate()?;
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        if let Some(fail) = &self.fail_with {
            return Err(fail());
        }
        Ok(SendResult {
            message_id: Some(format!("sent-{}", sent.len())),
            ok: Some(true),
            data: None,
        })
    }
}

pub struct StaticGenerator {
    reply: Reply,
}

impl StaticGenerator {
    pub fn new(text: &str) -> Self {
        Self {
            reply: Reply::text(text),
        }
    }

    pub fn with_submission(text: &str, draft: SubmissionDraft) -> Self {
        Self {
            reply: Reply {
                text: text.to_string(),
                submission: Some(draft),
            },
        }
    }
}

#[async_trait]
impl ReplyGenerator for StaticGenerator {
    async fn generate(
        &self,
        _text: &str,
        _context: Option<&str>,
        _user_id: Option<&UserId>,
    ) -> Result<Reply, ChipError> {
        Ok(self.reply.clone())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl ReplyGenerator for FailingGenerator {
    async fn generate(
        &self,
        _text: &str,
        _context: Option<&str>,
        _user_id: Option<&UserId>,
    ) -> Result<Reply, ChipError> {
        Err(ChipError::ReplyGeneration {
            message: "model unavailable".into(),
            source: None,
        })
    }
}

pub struct FixedContext(pub String);

#[async_trait]
impl ContextRetriever for FixedContext {
    async fn retrieve(&self, _query: &str) -> Result<String, ChipError> {
        Ok(self.0.clone())
    }
}

pub struct StaticUsers(pub Option<UserId>);

#[async_trait]
impl UserResolver for StaticUsers {
    async fn resolve(&self, _address: &str) -> Result<Option<UserId>, ChipError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingSubmissions {
    recorded: Mutex<Vec<(UserId, SubmissionDraft)>>,
}

impl RecordingSubmissions {
    pub fn recorded(&self) -> Vec<(UserId, SubmissionDraft)> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionRecorder for RecordingSubmissions {
    async fn record(
        &self,
        user_id: &UserId,
        draft: &SubmissionDraft,
    ) -> Result<Option<SubmissionRecord>, ChipError> {
        self.recorded
            .lock()
            .unwrap()
            .push((user_id.clone(), draft.clone()));
        Ok(Some(SubmissionRecord {
            id: "sub-1".into(),
            user_id: user_id.clone(),
            challenge_id: draft.challenge_id.clone(),
            submission_text: draft.submission_text.clone(),
            submission_url: draft.submission_url.clone(),
        }))
    }
}

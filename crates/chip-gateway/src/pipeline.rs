// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook handling: verify, normalize, filter, deduplicate, reply.
//!
//! Everything after verification is best-effort. Downstream failures are
//! logged and folded into the [`WebhookOutcome`] so the provider always sees
//! a success response and never retries into a duplicate send.

use std::sync::Arc;
use std::time::Duration;

use chip_config::ChipConfig;
use chip_core::{
    ChipError, ContextRetriever, Envelope, MessageType, MessagingAdapter, NormalizedEvent, Reply,
    ReplyGenerator, SendResult, SubmissionDraft, SubmissionRecorder, TextMessage, UserId,
    UserResolver,
};
use chip_dedup::{DedupCache, Fingerprint};
use chip_reply::{
    CatalogRetriever, MemberDirectory, RuleBasedReplyGenerator, SubmissionLog,
    TimeoutReplyGenerator, clean_message,
};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

const SUBMISSION_THANKS: &str = "Thanks! I've recorded your submission.";

/// Canned texts and filters applied by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Sender identity of the bot itself; inbound messages from it are dropped.
    pub bot_sender: String,
    /// Alert types treated as user messages.
    pub inbound_alert_types: Vec<String>,
    pub reply_timeout: Duration,
    pub greeting: String,
    pub audio_prompt: String,
    pub non_text_prompt: String,
    pub fallback: String,
}

impl PipelineSettings {
    pub fn from_config(config: &ChipConfig) -> Self {
        let reply = &config.reply;
        Self {
            bot_sender: config.agent.bot_sender.clone(),
            inbound_alert_types: reply.inbound_alert_types.clone(),
            reply_timeout: Duration::from_secs(reply.timeout_secs),
            greeting: reply.greeting.clone(),
            audio_prompt: reply.audio_prompt.clone(),
            non_text_prompt: reply.non_text_prompt.clone(),
            fallback: reply.fallback.clone(),
        }
    }

    fn is_user_message(&self, alert_type: Option<&str>) -> bool {
        alert_type.is_none_or(|alert| self.inbound_alert_types.iter().any(|a| a == alert))
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&ChipConfig::default())
    }
}

/// The services consulted while building a reply.
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn ReplyGenerator>,
    pub retriever: Arc<dyn ContextRetriever>,
    pub users: Arc<dyn UserResolver>,
    pub submissions: Arc<dyn SubmissionRecorder>,
}

impl Collaborators {
    /// In-process collaborators: rule-based replies over the configured
    /// catalog, members created on first contact, submissions kept in memory.
    pub fn in_process(config: &ChipConfig) -> Self {
        Self {
            generator: Arc::new(RuleBasedReplyGenerator),
            retriever: Arc::new(CatalogRetriever::new(config.reply.catalog.clone())),
            users: Arc::new(MemberDirectory::new()),
            submissions: Arc::new(SubmissionLog::new()),
        }
    }
}

/// What happened to one webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// A reply was generated. `sent` is `None` when the send failed.
    Replied {
        received_text: String,
        reply: String,
        sent: Option<SendResult>,
    },
    /// Deliberately not answered.
    Ignored { reason: String },
    /// A soft failure reported in the body instead of an error status.
    Failed {
        error: String,
        message_processed: bool,
    },
}

impl WebhookOutcome {
    fn ignored(reason: impl Into<String>) -> Self {
        WebhookOutcome::Ignored {
            reason: reason.into(),
        }
    }

    /// JSON body returned to the provider. `ok` is always true.
    pub fn to_json(&self) -> Value {
        match self {
            WebhookOutcome::Replied {
                received_text,
                reply,
                sent,
            } => json!({
                "ok": true,
                "received_text": received_text,
                "reply": reply,
                "sent": sent,
            }),
            WebhookOutcome::Ignored { reason } => json!({
                "ok": true,
                "ignored": true,
                "reason": reason,
            }),
            WebhookOutcome::Failed {
                error,
                message_processed,
            } => json!({
                "ok": true,
                "error": error,
                "message_processed": message_processed,
            }),
        }
    }
}

/// Webhook state machine shared by every provider.
pub struct WebhookPipeline {
    settings: PipelineSettings,
    dedup: Arc<DedupCache>,
    generator: Arc<dyn ReplyGenerator>,
    retriever: Arc<dyn ContextRetriever>,
    users: Arc<dyn UserResolver>,
    submissions: Arc<dyn SubmissionRecorder>,
}

impl WebhookPipeline {
    /// Reply generation is bounded by `settings.reply_timeout`.
    pub fn new(settings: PipelineSettings, dedup: Arc<DedupCache>, collaborators: Collaborators) -> Self {
        let generator: Arc<dyn ReplyGenerator> = Arc::new(TimeoutReplyGenerator::new(
            collaborators.generator,
            settings.reply_timeout,
        ));
        Self {
            settings,
            dedup,
            generator,
            retriever: collaborators.retriever,
            users: collaborators.users,
            submissions: collaborators.submissions,
        }
    }

    pub fn dedup(&self) -> &DedupCache {
        &self.dedup
    }

    /// Generate a reply for `message` without a provider, sender, or send.
    ///
    /// Context retrieval failures are tolerated as in [`handle`](Self::handle);
    /// generator failures and timeouts are returned.
    pub async fn preview_reply(&self, message: &str) -> Result<Reply, ChipError> {
        let context = match self.retriever.retrieve(message).await {
            Ok(context) => Some(context),
            Err(e) => {
                warn!(error = %e, "context retrieval failed");
                None
            }
        };
        self.generator.generate(message, context.as_deref(), None).await
    }

    /// Run one delivery through the pipeline.
    ///
    /// The only error is [`ChipError::Unauthorized`], returned before any
    /// side effect when the adapter rejects the credential.
    pub async fn handle(
        &self,
        adapter: &dyn MessagingAdapter,
        authorization: Option<&str>,
        body: &Value,
    ) -> Result<WebhookOutcome, ChipError> {
        let provider = adapter.name();
        adapter.verify_request(authorization)?;

        let event = match adapter.normalize_event(body) {
            Ok(event) => event,
            Err(e) => {
                warn!(provider, error = %e, "failed to normalize webhook");
                return Ok(WebhookOutcome::Failed {
                    error: format!("Failed to normalize event: {e}"),
                    message_processed: false,
                });
            }
        };
        debug!(
            provider,
            alert_type = ?event.alert_type,
            message_id = ?event.message_id,
            message_type = ?event.message_type,
            "webhook normalized"
        );

        if let Some(outcome) = self.handle_non_text(adapter, &event).await {
            return Ok(outcome);
        }

        if !self.settings.is_user_message(event.alert_type.as_deref()) {
            let alert = event.alert_type.as_deref().unwrap_or_default();
            info!(provider, alert_type = alert, "ignoring non-message event");
            return Ok(WebhookOutcome::ignored(format!(
                "Not a user message (alert_type: {alert})"
            )));
        }

        if event
            .recipient
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(&self.settings.bot_sender))
        {
            info!(provider, "ignoring message from bot itself");
            return Ok(WebhookOutcome::ignored("Message from bot itself"));
        }

        let cleaned = clean_message(&event.text);
        let fingerprint = Fingerprint::new(
            event.message_id.as_deref(),
            event.recipient.as_deref(),
            &cleaned,
        );
        if self.dedup.check_and_mark(&fingerprint) {
            info!(provider, fingerprint = %fingerprint, "duplicate delivery ignored");
            return Ok(WebhookOutcome::ignored("duplicate"));
        }

        let Some(recipient) = event.recipient.as_deref() else {
            info!(provider, "no recipient to reply to");
            return Ok(WebhookOutcome::ignored("No recipient to reply to"));
        };
        let target = reply_target(&event, recipient);

        let user_id = match self.users.resolve(recipient).await {
            Ok(user_id) => user_id,
            Err(e) => {
                warn!(provider, error = %e, "user lookup failed, continuing anonymously");
                None
            }
        };

        if cleaned.is_empty() {
            let sent = send_best_effort(adapter, target, &self.settings.greeting).await;
            return Ok(WebhookOutcome::Replied {
                received_text: cleaned,
                reply: self.settings.greeting.clone(),
                sent,
            });
        }

        let context = match self.retriever.retrieve(&cleaned).await {
            Ok(context) => Some(context),
            Err(e) => {
                warn!(provider, error = %e, "context retrieval failed");
                None
            }
        };

        let reply = match self
            .generator
            .generate(&cleaned, context.as_deref(), user_id.as_ref())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                error!(provider, error = %e, "reply generation failed");
                send_best_effort(adapter, target, &self.settings.fallback).await;
                return Ok(WebhookOutcome::Failed {
                    error: "Failed to generate reply".into(),
                    message_processed: true,
                });
            }
        };

        let mut reply_text = reply.text;
        if let (Some(draft), Some(user_id)) = (&reply.submission, &user_id)
            && self.record_submission(user_id, draft).await
            && !reply_text.to_lowercase().contains("submission")
        {
            reply_text = format!("{SUBMISSION_THANKS}\n\n{reply_text}");
        }

        let sent = send_best_effort(adapter, target, &reply_text).await;
        Ok(WebhookOutcome::Replied {
            received_text: cleaned,
            reply: reply_text,
            sent,
        })
    }

    /// Branch on non-text message types. `None` continues the text path.
    async fn handle_non_text(
        &self,
        adapter: &dyn MessagingAdapter,
        event: &NormalizedEvent,
    ) -> Option<WebhookOutcome> {
        let message_type = event.message_type.filter(|t| *t != MessageType::Text)?;
        let target = event.recipient.as_deref().map(|r| reply_target(event, r));

        match message_type {
            MessageType::Audio => {
                if let Some(target) = target {
                    send_best_effort(adapter, target, &self.settings.audio_prompt).await;
                }
                Some(WebhookOutcome::ignored("Audio message - requested text"))
            }
            MessageType::Reaction => {
                debug!(reaction = ?event.reaction, "reaction needs no reply");
                Some(WebhookOutcome::ignored("Reaction message - no response needed"))
            }
            other => {
                if let Some(target) = target
                    && event.text.trim().is_empty()
                {
                    send_best_effort(adapter, target, &self.settings.non_text_prompt).await;
                }
                Some(WebhookOutcome::ignored(format!("Non-text message type: {other}")))
            }
        }
    }

    async fn record_submission(&self, user_id: &UserId, draft: &SubmissionDraft) -> bool {
        match self.submissions.record(user_id, draft).await {
            Ok(Some(record)) => {
                info!(submission_id = %record.id, challenge_id = %record.challenge_id, "submission recorded");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, challenge_id = %draft.challenge_id, "failed to record submission");
                false
            }
        }
    }
}

/// Replies go to the group the message came from, otherwise to the sender.
fn reply_target(event: &NormalizedEvent, recipient: &str) -> Envelope {
    match event.group_id.as_deref() {
        Some(group) => Envelope::group(group),
        None => Envelope::to(recipient),
    }
}

/// Send `text`, logging and swallowing any failure. Opted-out recipients
/// are expected and only logged at debug.
async fn send_best_effort(
    adapter: &dyn MessagingAdapter,
    target: Envelope,
    text: &str,
) -> Option<SendResult> {
    let result = match TextMessage::new(target, text).build() {
        Ok(message) => adapter.send_message(&message).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(sent) => {
            debug!(provider = adapter.name(), message_id = ?sent.message_id, "reply sent");
            Some(sent)
        }
        Err(e) if e.is_recipient_unreachable() => {
            debug!(provider = adapter.name(), error = %e, "recipient unreachable, reply dropped");
            None
        }
        Err(e) => {
            warn!(provider = adapter.name(), error = %e, "failed to send reply");
            None
        }
    }
}

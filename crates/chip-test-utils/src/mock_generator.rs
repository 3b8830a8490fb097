// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply generator for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chip_core::{ChipError, Reply, ReplyGenerator, UserId};
use tokio::sync::Mutex;

/// One call observed by [`MockReplyGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub text: String,
    pub context: Option<String>,
    pub user_id: Option<UserId>,
}

/// A reply generator that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty the
/// default reply is returned.
pub struct MockReplyGenerator {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    default_reply: String,
    calls: Arc<Mutex<Vec<GenerateCall>>>,
    delay: Option<Duration>,
    fail: bool,
}

impl MockReplyGenerator {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            default_reply: "mock reply".to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            fail: false,
        }
    }

    /// Always reply with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            default_reply: text.into(),
            ..Self::new()
        }
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..Self::new()
        }
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every call with a reply-generation error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub async fn add_reply(&self, reply: Reply) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn calls(&self) -> Vec<GenerateCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockReplyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyGenerator for MockReplyGenerator {
    async fn generate(
        &self,
        text: &str,
        context: Option<&str>,
        user_id: Option<&UserId>,
    ) -> Result<Reply, ChipError> {
        self.calls.lock().await.push(GenerateCall {
            text: text.to_string(),
            context: context.map(str::to_string),
            user_id: user_id.cloned(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ChipError::ReplyGeneration {
                message: "mock generator failure".into(),
                source: None,
            });
        }

        let queued = self.replies.lock().await.pop_front();
        Ok(queued.unwrap_or_else(|| Reply::text(self.default_reply.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_replies_then_default() {
        let generator = MockReplyGenerator::with_replies(vec![Reply::text("first")]);
        let user = UserId("u-1".into());

        let first = generator.generate("hi", Some("ctx"), Some(&user)).await.unwrap();
        let second = generator.generate("again", None, None).await.unwrap();

        assert_eq!(first.text, "first");
        assert_eq!(second.text, "mock reply");
        let calls = generator.calls().await;
        assert_eq!(calls[0].context.as_deref(), Some("ctx"));
        assert_eq!(calls[0].user_id, Some(user));
        assert_eq!(calls[1].text, "again");
    }

    #[tokio::test]
    async fn failing_generator_errors() {
        let generator = MockReplyGenerator::failing();
        assert!(generator.generate("hi", None, None).await.is_err());
        assert_eq!(generator.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_observed() {
        let generator = MockReplyGenerator::always("late").with_delay(Duration::from_secs(30));
        let started = tokio::time::Instant::now();
        let reply = generator.generate("hi", None, None).await.unwrap();
        assert_eq!(reply.text, "late");
        assert!(started.elapsed() >= Duration::from_secs(30));
    }
}

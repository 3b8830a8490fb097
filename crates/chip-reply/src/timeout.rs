// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chip_core::{ChipError, Reply, ReplyGenerator, UserId};
use tracing::warn;

/// Bounds any [`ReplyGenerator`] by a deadline. An elapsed deadline is
/// reported as [`ChipError::Timeout`].
pub struct TimeoutReplyGenerator {
    inner: Arc<dyn ReplyGenerator>,
    timeout: Duration,
}

impl TimeoutReplyGenerator {
    pub fn new(inner: Arc<dyn ReplyGenerator>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl ReplyGenerator for TimeoutReplyGenerator {
    async fn generate(
        &self,
        text: &str,
        context: Option<&str>,
        user_id: Option<&UserId>,
    ) -> Result<Reply, ChipError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(text, context, user_id)).await
        {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(timeout_secs = self.timeout.as_secs(), "reply generation timed out");
                Err(ChipError::Timeout {
                    duration: self.timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow(Duration);

    #[async_trait]
    impl ReplyGenerator for Slow {
        async fn generate(
            &self,
            text: &str,
            _context: Option<&str>,
            _user_id: Option<&UserId>,
        ) -> Result<Reply, ChipError> {
            tokio::time::sleep(self.0).await;
            Ok(Reply::text(format!("echo: {text}")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fast_generator_passes_through() {
        let generator =
            TimeoutReplyGenerator::new(Arc::new(Slow(Duration::from_millis(10))), Duration::from_secs(1));
        let reply = generator.generate("hi", None, None).await.unwrap();
        assert_eq!(reply.text, "echo: hi");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generator_times_out() {
        let generator =
            TimeoutReplyGenerator::new(Arc::new(Slow(Duration::from_secs(60))), Duration::from_secs(20));
        let err = generator.generate("hi", None, None).await.unwrap_err();
        assert!(matches!(err, ChipError::Timeout { duration } if duration == Duration::from_secs(20)));
    }
}

// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborators the webhook pipeline consults while building a reply.

use async_trait::async_trait;

use crate::error::ChipError;
use crate::types::{Reply, SubmissionDraft, SubmissionRecord, UserId};

/// Produces the reply text for a cleaned user message.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(
        &self,
        text: &str,
        context: Option<&str>,
        user_id: Option<&UserId>,
    ) -> Result<Reply, ChipError>;
}

/// Looks up community context relevant to a query.
///
/// May return an empty string or a "no context" sentinel.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<String, ChipError>;
}

/// Maps a phone number or email to a community member.
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Option<UserId>, ChipError>;
}

/// Persists challenge submissions detected by the reply generator.
#[async_trait]
pub trait SubmissionRecorder: Send + Sync {
    async fn record(
        &self,
        user_id: &UserId,
        draft: &SubmissionDraft,
    ) -> Result<Option<SubmissionRecord>, ChipError>;
}

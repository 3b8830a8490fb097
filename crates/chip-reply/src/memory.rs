// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process member directory and submission store.
//!
//! Both live only as long as the process. Members are created on first
//! contact; a second submission for the same challenge replaces the first.
//! Each store holds at most a fixed number of entries. Once full, known
//! members still resolve and existing submissions can still be replaced,
//! but new entries are refused with [`ChipError::Downstream`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chip_core::{ChipError, SubmissionDraft, SubmissionRecord, SubmissionRecorder, UserId, UserResolver};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default cap on distinct member addresses.
pub const DEFAULT_MAX_MEMBERS: usize = 100_000;

/// Default cap on stored (member, challenge) submissions.
pub const DEFAULT_MAX_SUBMISSIONS: usize = 100_000;

fn store_full(service: &str, limit: usize) -> ChipError {
    warn!(service, limit, "in-process store is full");
    ChipError::Downstream {
        service: service.to_string(),
        message: format!("capacity of {limit} entries reached"),
    }
}

/// Assigns a stable [`UserId`] to each sender address.
///
/// Addresses are matched after trimming and lowercasing, so
/// `User@Example.com` and `user@example.com` are one member.
#[derive(Debug)]
pub struct MemberDirectory {
    members: Mutex<HashMap<String, UserId>>,
    max_members: usize,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_MEMBERS)
    }

    pub fn with_limit(max_members: usize) -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
            max_members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserResolver for MemberDirectory {
    async fn resolve(&self, address: &str) -> Result<Option<UserId>, ChipError> {
        let key = address.trim().to_lowercase();
        if key.is_empty() {
            return Ok(None);
        }
        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = members.get(&key) {
            return Ok(Some(id.clone()));
        }
        if members.len() >= self.max_members {
            return Err(store_full("member directory", self.max_members));
        }

        let id = UserId(Uuid::new_v4().to_string());
        debug!(user_id = %id, "registered new member");
        members.insert(key, id.clone());
        Ok(Some(id))
    }
}

impl Default for MemberDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Stores one submission per (member, challenge) pair.
#[derive(Debug)]
pub struct SubmissionLog {
    records: Mutex<HashMap<(UserId, String), SubmissionRecord>>,
    max_records: usize,
}

impl SubmissionLog {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_SUBMISSIONS)
    }

    pub fn with_limit(max_records: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            max_records,
        }
    }

    /// Submissions made by `user_id`.
    pub fn for_user(&self, user_id: &UserId) -> Vec<SubmissionRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .values()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Submissions made for `challenge_id`.
    pub fn for_challenge(&self, challenge_id: &str) -> Vec<SubmissionRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .values()
            .filter(|r| r.challenge_id == challenge_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SubmissionRecorder for SubmissionLog {
    async fn record(
        &self,
        user_id: &UserId,
        draft: &SubmissionDraft,
    ) -> Result<Option<SubmissionRecord>, ChipError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (user_id.clone(), draft.challenge_id.clone());
        let id = match records.get(&key) {
            Some(existing) => existing.id.clone(),
            None if records.len() >= self.max_records => {
                return Err(store_full("submission log", self.max_records));
            }
            None => Uuid::new_v4().to_string(),
        };

        let record = SubmissionRecord {
            id,
            user_id: user_id.clone(),
            challenge_id: draft.challenge_id.clone(),
            submission_text: draft.submission_text.clone(),
            submission_url: draft.submission_url.clone(),
        };
        records.insert(key, record.clone());
        debug!(user_id = %user_id, challenge_id = %draft.challenge_id, "submission recorded");
        Ok(Some(record))
    }
}

impl Default for SubmissionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(challenge: &str, text: &str) -> SubmissionDraft {
        SubmissionDraft {
            challenge_id: challenge.into(),
            submission_text: text.into(),
            submission_url: None,
        }
    }

    #[tokio::test]
    async fn same_address_same_member() {
        let directory = MemberDirectory::new();
        let a = directory.resolve("User@Example.com").await.unwrap().unwrap();
        let b = directory.resolve("  user@example.com ").await.unwrap().unwrap();
        let c = directory.resolve("+15551234567").await.unwrap().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(directory.len(), 2);
        assert!(Uuid::parse_str(&a.0).is_ok());
    }

    #[tokio::test]
    async fn blank_address_is_anonymous() {
        let directory = MemberDirectory::new();
        assert!(directory.resolve("   ").await.unwrap().is_none());
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn resubmission_replaces_previous() {
        let log = SubmissionLog::new();
        let user = UserId("u-1".into());

        let first = log.record(&user, &draft("c-1", "v1")).await.unwrap().unwrap();
        let second = log.record(&user, &draft("c-1", "v2")).await.unwrap().unwrap();
        log.record(&user, &draft("c-2", "other")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(log.for_challenge("c-1").len(), 1);
        assert_eq!(log.for_challenge("c-1")[0].submission_text, "v2");
        assert_eq!(log.for_user(&user).len(), 2);
    }

    #[tokio::test]
    async fn full_directory_refuses_new_members_only() {
        let directory = MemberDirectory::with_limit(2);
        let a = directory.resolve("+15550000001").await.unwrap().unwrap();
        directory.resolve("+15550000002").await.unwrap();

        let err = directory.resolve("+15550000003").await.unwrap_err();
        assert!(matches!(err, ChipError::Downstream { .. }));
        assert_eq!(err.to_string(), "member directory error: capacity of 2 entries reached");
        assert_eq!(directory.resolve("+15550000001").await.unwrap(), Some(a));
        assert_eq!(directory.len(), 2);
    }

    #[tokio::test]
    async fn full_log_still_replaces_existing_submission() {
        let log = SubmissionLog::with_limit(1);
        let user = UserId("u-1".into());

        log.record(&user, &draft("c-1", "v1")).await.unwrap();
        let err = log.record(&user, &draft("c-2", "new")).await.unwrap_err();
        assert!(matches!(err, ChipError::Downstream { .. }));

        let replaced = log.record(&user, &draft("c-1", "v2")).await.unwrap().unwrap();
        assert_eq!(replaced.submission_text, "v2");
        assert!(log.for_challenge("c-2").is_empty());
    }
}

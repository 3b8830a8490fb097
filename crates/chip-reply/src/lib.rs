// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply collaborators for the Chip messaging agent.
//!
//! Everything here runs in-process: message cleanup, a rule-based reply
//! generator, keyword retrieval over the configured catalog, and the member
//! and submission stores consulted by the webhook pipeline.

pub mod cleanup;
pub mod generator;
pub mod memory;
pub mod retriever;
pub mod submission;
pub mod timeout;

pub use cleanup::{clean_message, correct_typos};
pub use generator::RuleBasedReplyGenerator;
pub use memory::{MemberDirectory, SubmissionLog};
pub use retriever::{CatalogRetriever, NO_CONTEXT};
pub use submission::detect_submission;
pub use timeout::TimeoutReplyGenerator;

// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for messaging providers and the reply collaborators.
//!
//! All traits use `#[async_trait]` so they can be held as `Arc<dyn _>`.

pub mod collaborators;
pub mod messaging;

pub use collaborators::{ContextRetriever, ReplyGenerator, SubmissionRecorder, UserResolver};
pub use messaging::MessagingAdapter;

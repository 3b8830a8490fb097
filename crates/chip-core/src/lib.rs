// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Chip messaging agent.
//!
//! This crate provides the error taxonomy, the inbound/outbound message
//! model, and the traits implemented by messaging adapters and reply
//! collaborators.

pub mod auth;
pub mod error;
pub mod message;
pub mod normalize;
pub mod traits;
pub mod types;

pub use error::ChipError;
pub use message::{AudioMessage, Envelope, OutboundMessage, ReactionMessage, TextMessage};
pub use types::{
    Effect, MessageType, NormalizedEvent, ReactionType, Reply, SendResult, ServiceType,
    SubmissionDraft, SubmissionRecord, UserId,
};

pub use traits::{
    ContextRetriever, MessagingAdapter, ReplyGenerator, SubmissionRecorder, UserResolver,
};

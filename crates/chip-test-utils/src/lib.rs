// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Chip integration tests.
//!
//! Provides mock collaborators and a router harness for fast, deterministic
//! tests without provider credentials or network access.
//!
//! # Components
//!
//! - [`MockAdapter`] - Messaging adapter with real webhook normalization and captured sends
//! - [`MockReplyGenerator`] - Reply generator with pre-configured replies
//! - [`TestHarness`] - Assembled registry, pipeline, and router

pub mod harness;
pub mod mock_adapter;
pub mod mock_generator;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_adapter::MockAdapter;
pub use mock_generator::MockReplyGenerator;

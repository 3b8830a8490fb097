// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Chip messaging agent.

use thiserror::Error;

/// Provider error codes that mean the recipient cannot be reached
/// (opted out, unsubscribed, blocked). Sends failing with these are expected.
const UNREACHABLE_CODES: &[&str] = &["280", "21610", "21614"];

/// The primary error type used across adapters, collaborators, and the pipeline.
#[derive(Debug, Error)]
pub enum ChipError {
    /// Missing or invalid configuration (credentials, endpoints).
    #[error("configuration error: {0}")]
    Config(String),

    /// A message or request failed validation before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Webhook credential missing or incorrect.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Inbound payload could not be normalized.
    #[error("normalization error: {0}")]
    Normalization(String),

    /// Requested adapter was not found in the registry.
    #[error("adapter not found: {name}")]
    AdapterNotFound { name: String },

    /// Outbound provider rejected the message or could not be reached.
    #[error("send error: {message}")]
    Send {
        message: String,
        /// HTTP status returned by the provider, when one was received.
        status: Option<u16>,
        /// Raw provider error body, for diagnostics.
        detail: Option<serde_json::Value>,
    },

    /// Reply generation failed.
    #[error("reply generation failed: {message}")]
    ReplyGeneration {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A downstream collaborator (user lookup, submissions, context) failed.
    #[error("{service} error: {message}")]
    Downstream { service: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChipError {
    /// Whether this error is a provider send failure caused by the recipient
    /// having opted out or being otherwise unreachable.
    pub fn is_recipient_unreachable(&self) -> bool {
        let ChipError::Send {
            message, detail, ..
        } = self
        else {
            return false;
        };

        let detail_code = detail.as_ref().and_then(|d| match d.get("code")? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) => Some(s.trim().to_string()),
            _ => None,
        });
        if detail_code.is_some_and(|code| UNREACHABLE_CODES.contains(&code.as_str())) {
            return true;
        }

        // Non-JSON provider bodies are kept as a bare string.
        let detail_message = match detail {
            Some(serde_json::Value::String(body)) => body.as_str(),
            Some(d) => d
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default(),
            None => "",
        };
        [message.as_str(), detail_message].iter().any(|text| {
            let text = text.to_lowercase();
            text.contains("opted out") || text.contains("unsubscribed")
        })
    }

    /// HTTP status the API layer uses when surfacing this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ChipError::Validation(_) | ChipError::Normalization(_) => 400,
            ChipError::Unauthorized(_) => 401,
            ChipError::AdapterNotFound { .. } => 404,
            ChipError::Send { .. } | ChipError::Downstream { .. } => 502,
            ChipError::Timeout { .. } => 504,
            ChipError::Config(_) | ChipError::ReplyGeneration { .. } | ChipError::Internal(_) => {
                500
            }
        }
    }

    /// Shorthand for a send error without provider detail.
    pub fn send(message: impl Into<String>) -> Self {
        ChipError::Send {
            message: message.into(),
            status: None,
            detail: None,
        }
    }
}

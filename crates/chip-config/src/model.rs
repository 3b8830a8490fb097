// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Chip messaging agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level Chip configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChipConfig {
    /// Agent identity settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LoopMessage (iMessage/SMS) provider settings.
    #[serde(default, rename = "loop")]
    pub loop_message: LoopConfig,

    /// Twilio SMS provider settings.
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// Duplicate-delivery cache settings.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Reply generation settings.
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// Agent identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Sender address the bot itself uses. Inbound messages from this
    /// address are dropped.
    #[serde(default = "default_bot_sender")]
    pub bot_sender: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            bot_sender: default_bot_sender(),
        }
    }
}

fn default_agent_name() -> String {
    "chip".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bot_sender() -> String {
    "chip@ai.imsg.bot".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Provider used by the send API when the request names none.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Path prefix for every route.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_provider: default_provider(),
            api_prefix: default_api_prefix(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_provider() -> String {
    "loop".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

/// LoopMessage provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoopConfig {
    /// Send endpoint.
    #[serde(default = "default_loop_send_url")]
    pub send_url: String,

    /// Value of the `Authorization` header on outbound requests.
    #[serde(default)]
    pub authorization: Option<String>,

    /// Value of the `Loop-Secret-Key` header on outbound requests.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Dedicated sender name, when the account has one.
    #[serde(default)]
    pub sender_name: Option<String>,

    /// Expected bearer credential on inbound webhooks. `None` disables
    /// verification.
    #[serde(default)]
    pub webhook_auth: Option<String>,

    /// URL the provider posts delivery status updates to.
    #[serde(default)]
    pub status_callback_url: Option<String>,

    /// Authorization header value the provider sends with status callbacks.
    #[serde(default)]
    pub status_callback_auth: Option<String>,

    /// Outbound HTTP timeout.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            send_url: default_loop_send_url(),
            authorization: None,
            secret_key: None,
            sender_name: None,
            webhook_auth: None,
            status_callback_url: None,
            status_callback_auth: None,
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl fmt::Debug for LoopConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopConfig")
            .field("send_url", &self.send_url)
            .field("authorization", &redact(&self.authorization))
            .field("secret_key", &redact(&self.secret_key))
            .field("sender_name", &self.sender_name)
            .field("webhook_auth", &redact(&self.webhook_auth))
            .field("status_callback_url", &self.status_callback_url)
            .field("status_callback_auth", &redact(&self.status_callback_auth))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_loop_send_url() -> String {
    "https://server.loopmessage.com/api/v1/message/send/".to_string()
}

fn default_provider_timeout() -> u64 {
    15
}

/// Twilio SMS provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioConfig {
    /// Register the adapter even without an account SID.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub account_sid: Option<String>,

    #[serde(default)]
    pub auth_token: Option<String>,

    /// E.164 number messages are sent from.
    #[serde(default)]
    pub from_number: Option<String>,

    /// Expected bearer credential on inbound webhooks. `None` disables
    /// verification.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// REST API base URL.
    #[serde(default = "default_twilio_api_base")]
    pub api_base: String,

    /// Outbound HTTP timeout.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_sid: None,
            auth_token: None,
            from_number: None,
            webhook_secret: None,
            api_base: default_twilio_api_base(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl TwilioConfig {
    /// Whether the Twilio adapter should be registered.
    pub fn is_active(&self) -> bool {
        self.enabled || self.account_sid.is_some()
    }
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("enabled", &self.enabled)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &redact(&self.auth_token))
            .field("from_number", &self.from_number)
            .field("webhook_secret", &redact(&self.webhook_secret))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_string()
}

/// Duplicate-delivery cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    /// Entries older than this are purged.
    #[serde(default = "default_dedup_ttl")]
    pub ttl_secs: u64,

    /// A repeat inside this window is a duplicate.
    #[serde(default = "default_dedup_window")]
    pub window_secs: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_dedup_ttl(),
            window_secs: default_dedup_window(),
        }
    }
}

fn default_dedup_ttl() -> u64 {
    3600
}

fn default_dedup_window() -> u64 {
    10
}

/// Reply generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyConfig {
    /// Upper bound on a single reply generation.
    #[serde(default = "default_reply_timeout")]
    pub timeout_secs: u64,

    /// Alert types treated as user messages. Events without an alert type
    /// are always treated as user messages.
    #[serde(default = "default_inbound_alert_types")]
    pub inbound_alert_types: Vec<String>,

    /// Reply to an empty message.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Reply to a voice memo.
    #[serde(default = "default_audio_prompt")]
    pub audio_prompt: String,

    /// Reply to stickers, locations, and bare attachments.
    #[serde(default = "default_non_text_prompt")]
    pub non_text_prompt: String,

    /// Reply sent when generation fails.
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Community opportunities and challenges searched for context.
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_reply_timeout(),
            inbound_alert_types: default_inbound_alert_types(),
            greeting: default_greeting(),
            audio_prompt: default_audio_prompt(),
            non_text_prompt: default_non_text_prompt(),
            fallback: default_fallback(),
            catalog: Vec::new(),
        }
    }
}

fn default_reply_timeout() -> u64 {
    20
}

fn default_inbound_alert_types() -> Vec<String> {
    ["message_inbound", "message.created", "received"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_greeting() -> String {
    "Thanks for your message! I'm Chip, your Alabama tech community AI agent. How can I help you today?"
        .to_string()
}

fn default_audio_prompt() -> String {
    "I received your audio message! Could you send that as text? I'm better at understanding written messages."
        .to_string()
}

fn default_non_text_prompt() -> String {
    "I received your message, but I'm best at handling text messages. Could you send that as text?"
        .to_string()
}

fn default_fallback() -> String {
    "I'm having trouble processing that right now. Could you try rephrasing your message?"
        .to_string()
}

/// One opportunity or challenge in the community catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    /// Stable identifier (challenges use UUIDs so submissions can reference them).
    pub id: String,

    /// Entry category, e.g. `challenge`, `internship`, `job`, `event`.
    pub kind: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: Option<String>,
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[redacted]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ChipConfig::default();
        assert_eq!(config.agent.bot_sender, "chip@ai.imsg.bot");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.dedup.ttl_secs, 3600);
        assert_eq!(config.dedup.window_secs, 10);
        assert_eq!(config.loop_message.timeout_secs, 15);
        assert!(config.reply.inbound_alert_types.contains(&"message_inbound".to_string()));
        assert!(!config.twilio.is_active());
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = LoopConfig {
            authorization: Some("auth-value".into()),
            secret_key: Some("secret-value".into()),
            webhook_auth: Some("hook-value".into()),
            ..LoopConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("auth-value"));
        assert!(!debug.contains("secret-value"));
        assert!(!debug.contains("hook-value"));
        assert!(debug.contains("[redacted]"));

        let twilio = TwilioConfig {
            account_sid: Some("AC123".into()),
            auth_token: Some("tok".into()),
            ..TwilioConfig::default()
        };
        let debug = format!("{twilio:?}");
        assert!(debug.contains("AC123"));
        assert!(!debug.contains("\"tok\""));
        assert!(twilio.is_active());
    }
}

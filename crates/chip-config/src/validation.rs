// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::ChipConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ChipConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!("server.host `{host}` is not a valid IP address or hostname"));
    }

    if !config.server.api_prefix.is_empty() && !config.server.api_prefix.starts_with('/') {
        fail(format!(
            "server.api_prefix `{}` must start with `/`",
            config.server.api_prefix
        ));
    }

    if config.server.default_provider.trim().is_empty() {
        fail("server.default_provider must not be empty".to_string());
    }

    if config.agent.bot_sender.trim().is_empty() {
        fail("agent.bot_sender must not be empty".to_string());
    }

    match url::Url::parse(&config.loop_message.send_url) {
        Ok(url) if url.scheme() == "https" => {}
        _ => fail(format!(
            "loop.send_url `{}` must be an https URL",
            config.loop_message.send_url
        )),
    }

    if url::Url::parse(&config.twilio.api_base).is_err() {
        fail(format!(
            "twilio.api_base `{}` is not a valid URL",
            config.twilio.api_base
        ));
    }

    for (key, value) in [
        ("loop.timeout_secs", config.loop_message.timeout_secs),
        ("twilio.timeout_secs", config.twilio.timeout_secs),
        ("reply.timeout_secs", config.reply.timeout_secs),
        ("dedup.ttl_secs", config.dedup.ttl_secs),
    ] {
        if value == 0 {
            fail(format!("{key} must be greater than 0"));
        }
    }

    if config.dedup.window_secs > config.dedup.ttl_secs {
        fail(format!(
            "dedup.window_secs ({}) must not exceed dedup.ttl_secs ({})",
            config.dedup.window_secs, config.dedup.ttl_secs
        ));
    }

    let mut seen = HashSet::new();
    for (i, entry) in config.reply.catalog.iter().enumerate() {
        if entry.id.trim().is_empty() {
            fail(format!("reply.catalog[{i}].id must not be empty"));
        } else if !seen.insert(entry.id.as_str()) {
            fail(format!("duplicate catalog id `{}` in [[reply.catalog]]", entry.id));
        }
        if entry.title.trim().is_empty() {
            fail(format!("reply.catalog[{i}].title must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogEntry;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            kind: "challenge".to_string(),
            title: "Build a bot".to_string(),
            description: String::new(),
            url: None,
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ChipConfig::default()).is_ok());
    }

    #[test]
    fn window_longer_than_ttl_fails() {
        let mut config = ChipConfig::default();
        config.dedup.ttl_secs = 5;
        config.dedup.window_secs = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "dedup.window_secs"));
    }

    #[test]
    fn plain_http_send_url_fails() {
        let mut config = ChipConfig::default();
        config.loop_message.send_url = "http://example.com/send".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "loop.send_url"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ChipConfig::default();
        config.server.host = String::new();
        config.reply.timeout_secs = 0;
        config.reply.catalog = vec![entry("a"), entry("a")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "server.host"));
        assert!(has_error(&errors, "reply.timeout_secs"));
        assert!(has_error(&errors, "duplicate catalog id `a`"));
    }

    #[test]
    fn api_prefix_needs_leading_slash() {
        let mut config = ChipConfig::default();
        config.server.api_prefix = "api".to_string();
        assert!(has_error(&validate_config(&config).unwrap_err(), "api_prefix"));

        config.server.api_prefix = String::new();
        assert!(validate_config(&config).is_ok());
    }
}

// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chip config check`: a human-readable summary of the loaded configuration.
//!
//! Credentials are reported as set/unset only.

use std::fmt::Write;

use chip_config::ChipConfig;

fn presence(value: &Option<String>) -> &'static str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => "set",
        _ => "unset",
    }
}

/// Summarize `config` without revealing any secret values.
pub fn summary(config: &ChipConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "chip: configuration OK");
    let _ = writeln!(out, "  agent.name          = {}", config.agent.name);
    let _ = writeln!(out, "  agent.log_level     = {}", config.agent.log_level);
    let _ = writeln!(out, "  agent.bot_sender    = {}", config.agent.bot_sender);
    let _ = writeln!(
        out,
        "  server              = {}:{} (prefix {:?}, default provider {})",
        config.server.host,
        config.server.port,
        config.server.api_prefix,
        config.server.default_provider
    );

    let lp = &config.loop_message;
    let _ = writeln!(out, "  loop.send_url       = {}", lp.send_url);
    let _ = writeln!(
        out,
        "  loop credentials    = authorization {}, secret_key {}, webhook_auth {}",
        presence(&lp.authorization),
        presence(&lp.secret_key),
        presence(&lp.webhook_auth)
    );

    let tw = &config.twilio;
    if tw.is_active() {
        let _ = writeln!(
            out,
            "  twilio              = active (from {}, auth_token {}, webhook_secret {})",
            tw.from_number.as_deref().unwrap_or("unset"),
            presence(&tw.auth_token),
            presence(&tw.webhook_secret)
        );
    } else {
        let _ = writeln!(out, "  twilio              = inactive");
    }

    let _ = writeln!(
        out,
        "  dedup               = ttl {}s, window {}s",
        config.dedup.ttl_secs, config.dedup.window_secs
    );
    let _ = write!(
        out,
        "  reply               = timeout {}s, {} catalog entries",
        config.reply.timeout_secs,
        config.reply.catalog.len()
    );
    out
}

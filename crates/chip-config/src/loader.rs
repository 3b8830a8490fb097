// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chip.toml` > `~/.config/chip/chip.toml` > `/etc/chip/chip.toml`
//! with environment variable overrides via `CHIP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ChipConfig;

/// Top-level sections an environment variable can target.
const SECTIONS: &[&str] = &["agent", "server", "loop", "twilio", "dedup", "reply"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chip/chip.toml` (system-wide)
/// 3. `~/.config/chip/chip.toml` (user XDG config)
/// 4. `./chip.toml` (local directory)
/// 5. `CHIP_*` environment variables
pub fn load_config() -> Result<ChipConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ChipConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChipConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChipConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChipConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChipConfig::default()))
        .merge(Toml::file("/etc/chip/chip.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("chip/chip.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("chip.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `CHIP_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `CHIP_LOOP_WEBHOOK_AUTH` maps to `loop.webhook_auth`.
fn env_provider() -> Env {
    Env::prefixed("CHIP_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}

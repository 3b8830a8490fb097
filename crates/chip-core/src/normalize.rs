// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered field-extraction rules for shape-tolerant webhook parsing.
//!
//! Adapters describe each [`NormalizedEvent`](crate::NormalizedEvent) field
//! as a list of [`FieldRule`]s tried in order. The first rule that yields a
//! non-empty value wins. No rule ever fails: a type mismatch simply moves on
//! to the next candidate.

use std::str::FromStr;

use serde_json::Value;

/// How a located JSON value is turned into a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    /// Strings as-is, other non-null values in their JSON text form.
    Lossy,
    /// Strings only; anything else is treated as absent.
    Strict,
    /// A string, or an object whose `address`/`recipient` key holds one.
    Address,
}

/// One candidate location for a field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub path: &'static [&'static str],
    pub coerce: Coerce,
}

impl FieldRule {
    pub const fn lossy(path: &'static [&'static str]) -> Self {
        Self {
            path,
            coerce: Coerce::Lossy,
        }
    }

    pub const fn strict(path: &'static [&'static str]) -> Self {
        Self {
            path,
            coerce: Coerce::Strict,
        }
    }

    pub const fn address(path: &'static [&'static str]) -> Self {
        Self {
            path,
            coerce: Coerce::Address,
        }
    }

    fn apply(&self, root: &Value) -> Option<String> {
        let value = lookup(root, self.path)?;
        let text = match self.coerce {
            Coerce::Lossy => lossy_string(value),
            Coerce::Strict => value.as_str().map(str::to_owned),
            Coerce::Address => unwrap_address(value),
        }?;
        (!text.is_empty()).then_some(text)
    }
}

/// Walk `path` through nested objects.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |current, key| current.as_object()?.get(*key))
}

/// Apply `rules` in order and return the first non-empty match.
pub fn extract(root: &Value, rules: &[FieldRule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(root))
}

/// Parse a string value into an enum, ignoring case and surrounding
/// whitespace. Unknown or non-string values yield `None`.
pub fn parse_enum<T: FromStr>(value: Option<&Value>) -> Option<T> {
    value?.as_str()?.trim().parse().ok()
}

/// Whether a value counts as present when choosing between payload shapes:
/// non-empty strings and collections, non-zero numbers, `true`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Best-effort text for a payload that is not a JSON object.
pub fn fallback_text(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lossy_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn unwrap_address(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["address", "recipient"]
            .iter()
            .find_map(|key| map.get(*key)?.as_str().map(str::to_owned)),
        _ => None,
    }
}

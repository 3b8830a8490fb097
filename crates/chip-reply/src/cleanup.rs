// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound text cleanup and typo correction.
//!
//! Texts arrive from phones: stray control bytes, doubled spaces, and a
//! handful of recurring misspellings of community vocabulary. Cleanup runs
//! before fingerprinting so whitespace variants collapse to one message.

use std::sync::LazyLock;

use regex::Regex;

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F-\x{9F}]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());

static STACKED_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,!?;:])\s*([.,!?;:])").unwrap());

/// Misspellings of community vocabulary, always corrected.
const TYPOS: &[(&str, &str)] = &[
    ("challege", "challenge"),
    ("challange", "challenge"),
    ("challeng", "challenge"),
    ("chalenges", "challenges"),
    ("challanges", "challenges"),
    ("challengs", "challenges"),
    ("intership", "internship"),
    ("interships", "internships"),
    ("oppurtunity", "opportunity"),
    ("oportunity", "opportunity"),
    ("oppurtunities", "opportunities"),
    ("oportunities", "opportunities"),
    ("comunity", "community"),
    ("techincal", "technical"),
    ("techincally", "technically"),
    ("submited", "submitted"),
    ("submition", "submission"),
    ("submitions", "submissions"),
    ("compleated", "completed"),
    ("compleate", "complete"),
];

/// Texting shorthand, expanded only in aggressive mode.
const SHORTHAND: &[(&str, &str)] = &[
    ("wht", "what"),
    ("wat", "what"),
    ("wher", "where"),
    ("wen", "when"),
];

static TYPO_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| compile(TYPOS));
static SHORTHAND_RULES: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile(SHORTHAND));

fn compile(table: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    table
        .iter()
        .map(|(wrong, right)| (Regex::new(&format!(r"(?i)\b{wrong}\b")).unwrap(), *right))
        .collect()
}

/// Collapse whitespace runs and tidy spacing around punctuation.
pub fn normalize_spacing(text: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(text.trim(), " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    STACKED_PUNCT.replace_all(&text, "$1 $2").into_owned()
}

/// Normalize spacing and fix known misspellings. `aggressive` also expands
/// texting shorthand such as "wht" and "wen".
pub fn correct_typos(text: &str, aggressive: bool) -> String {
    let mut corrected = normalize_spacing(text);
    let shorthand: &[(Regex, &str)] = if aggressive {
        SHORTHAND_RULES.as_slice()
    } else {
        &[]
    };
    for (pattern, replacement) in TYPO_RULES.iter().chain(shorthand) {
        if pattern.is_match(&corrected) {
            corrected = pattern.replace_all(&corrected, *replacement).into_owned();
        }
    }
    corrected
}

/// Clean an inbound message: drop control characters (newlines and tabs
/// survive until whitespace collapsing), then normalize and correct typos.
pub fn clean_message(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = CONTROL_CHARS.replace_all(text, "");
    correct_typos(stripped.trim(), false)
}

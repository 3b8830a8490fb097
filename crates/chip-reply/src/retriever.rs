// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword context retrieval over the configured community catalog.

use async_trait::async_trait;
use chip_config::model::CatalogEntry;
use chip_core::{ChipError, ContextRetriever};
use tracing::debug;

/// Returned when nothing in the catalog matches the query.
pub const NO_CONTEXT: &str = "No specific context found.";

const MAX_RESULTS: usize = 5;

const OPPORTUNITY_WORDS: &[&str] = &[
    "job", "employ", "hire", "hiring", "career", "position", "opening", "opportunit", "intern",
];
const CHALLENGE_WORDS: &[&str] = &["challenge", "project", "hackathon", "competition"];

const STOP_WORDS: &[&str] = &[
    "about", "and", "any", "are", "can", "for", "from", "have", "how", "into", "me", "show",
    "some", "tell", "that", "the", "there", "this", "what", "when", "where", "which", "who",
    "with", "you", "your",
];

/// Scores catalog entries by word overlap with the query.
///
/// Each query word found in an entry's kind, title, or description adds a
/// point; asking about jobs or challenges in general adds a point to every
/// entry of that family. Ties keep catalog order.
#[derive(Debug, Clone, Default)]
pub struct CatalogRetriever {
    entries: Vec<CatalogEntry>,
}

impl CatalogRetriever {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best matches for `query`, highest score first.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let lowered = query.to_lowercase();
        let words = query_words(&lowered);
        let wants_opportunities = OPPORTUNITY_WORDS.iter().any(|w| lowered.contains(w));
        let wants_challenges = CHALLENGE_WORDS.iter().any(|w| lowered.contains(w));

        let mut scored: Vec<(usize, &CatalogEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let haystack =
                    format!("{} {} {}", entry.kind, entry.title, entry.description).to_lowercase();
                let mut score = words.iter().filter(|w| haystack.contains(w.as_str())).count();
                let is_challenge = entry.kind.eq_ignore_ascii_case("challenge");
                if (wants_challenges && is_challenge) || (wants_opportunities && !is_challenge) {
                    score += 1;
                }
                (score > 0).then_some((score, entry))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_RESULTS)
            .map(|(_, entry)| entry)
            .collect()
    }
}

#[async_trait]
impl ContextRetriever for CatalogRetriever {
    async fn retrieve(&self, query: &str) -> Result<String, ChipError> {
        let matches = self.search(query);
        debug!(matches = matches.len(), catalog = self.entries.len(), "catalog lookup");
        if matches.is_empty() {
            return Ok(NO_CONTEXT.to_string());
        }
        Ok(matches
            .iter()
            .enumerate()
            .map(|(i, entry)| render_entry(i + 1, entry))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn render_entry(position: usize, entry: &CatalogEntry) -> String {
    let mut line = format!("{position}. {} ({}, ID: {})", entry.title, entry.kind, entry.id);
    if !entry.description.is_empty() {
        line.push_str(": ");
        line.push_str(&entry.description);
    }
    if let Some(url) = entry.url.as_deref().filter(|u| !u.is_empty()) {
        line.push_str("\n   ");
        line.push_str(url);
    }
    line
}

/// Lowercased content words of at least three letters, with a trailing
/// plural `s` dropped so "jobs" matches "job".
fn query_words(lowered: &str) -> Vec<String> {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3 && !STOP_WORDS.contains(w))
        .map(|w| {
            if w.len() > 3 && w.ends_with('s') {
                w[..w.len() - 1].to_string()
            } else {
                w.to_string()
            }
        })
        .collect()
}

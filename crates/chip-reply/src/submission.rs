// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detection of challenge submissions in user messages.

use std::sync::LazyLock;

use chip_core::SubmissionDraft;
use regex::Regex;

use crate::cleanup::correct_typos;

/// Words signalling the user finished a challenge. Misspellings are listed
/// too because detection also runs on the uncorrected message.
const SUBMISSION_KEYWORDS: &[&str] = &[
    "submitted",
    "submission",
    "completed",
    "finished",
    "done",
    "submited",
    "submition",
    "compleated",
    "compleate",
];

static CHALLENGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s<>]+").unwrap());

/// Whether `message` reads like a submission announcement.
pub fn mentions_submission(message: &str) -> bool {
    let lowered = message.to_lowercase();
    let corrected = correct_typos(&lowered, false);
    SUBMISSION_KEYWORDS
        .iter()
        .any(|kw| lowered.contains(kw) || corrected.contains(kw))
}

/// Build a draft when `message` announces a submission and `context`
/// names a challenge with a UUID id. The first id in the context wins.
///
/// The draft keeps the user's original wording; the first link in the
/// message becomes the submission URL.
pub fn detect_submission(message: &str, context: Option<&str>) -> Option<SubmissionDraft> {
    if !mentions_submission(message) {
        return None;
    }
    let context = context?;
    if !context.to_lowercase().contains("challenge") {
        return None;
    }
    let challenge_id = CHALLENGE_ID.find(context)?.as_str().to_lowercase();
    let submission_url = LINK
        .find(message)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', '!', '?']).to_string());

    Some(SubmissionDraft {
        challenge_id,
        submission_text: message.to_string(),
        submission_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = "1. Smart Parking Challenge (challenge, ID: 3F2B8C1E-4D5A-4B6C-9E7F-0A1B2C3D4E5F): Build it\n\
                           2. Water Challenge (challenge, ID: 11111111-2222-3333-4444-555555555555)";

    #[test]
    fn detects_submission_with_first_challenge_id() {
        let draft = detect_submission("I submitted my project!", Some(CONTEXT)).unwrap();
        assert_eq!(draft.challenge_id, "3f2b8c1e-4d5a-4b6c-9e7f-0a1b2c3d4e5f");
        assert_eq!(draft.submission_text, "I submitted my project!");
        assert!(draft.submission_url.is_none());
    }

    #[test]
    fn misspelled_keywords_count() {
        assert!(mentions_submission("just compleated the parking one"));
        assert!(mentions_submission("here is my submition"));
        assert!(!mentions_submission("what challenges are open?"));
    }

    #[test]
    fn captures_link() {
        let draft = detect_submission(
            "Done! Repo: https://github.com/me/parking.",
            Some(CONTEXT),
        )
        .unwrap();
        assert_eq!(draft.submission_url.as_deref(), Some("https://github.com/me/parking"));
    }

    #[test]
    fn requires_challenge_context_with_id() {
        assert!(detect_submission("I finished", None).is_none());
        assert!(detect_submission("I finished", Some("1. Backend Engineer (job, ID: job-1)")).is_none());
        assert!(detect_submission("I finished", Some("the challenge has no id")).is_none());
    }

    #[test]
    fn requires_keyword() {
        assert!(detect_submission("tell me about parking", Some(CONTEXT)).is_none());
    }
}

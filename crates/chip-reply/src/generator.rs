// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic reply generation.
//!
//! [`RuleBasedReplyGenerator`] classifies the message into an [`Intent`]
//! and renders a canned reply around the retrieved context. It never calls
//! out to a model, so it cannot fail.

use std::sync::LazyLock;

use async_trait::async_trait;
use chip_core::{ChipError, Reply, ReplyGenerator, UserId};
use regex::Regex;
use tracing::debug;

use crate::cleanup::correct_typos;
use crate::submission::detect_submission;

const OUT_OF_SCOPE_REPLY: &str = "I'm here to help with Alabama tech community opportunities, \
internships, challenges, and events. I can't answer that one, but tell me what kind of \
opportunity or challenge you're after and I'll share some options.";

const NOT_FOUND_REPLY: &str = "I couldn't find any opportunities or challenges matching that. \
Try asking about \"internships\", \"jobs\", or \"challenges\" in the Alabama tech community, \
or reach out to the Innovation Portal team for more details.";

const SELECTION_REPLY: &str = "Got it, you're interested in one of the options I shared. \
Reply with its title or a short description and I'll help with the next steps.";

const JOBS_HEADING: &str = "Here are some Alabama tech opportunities and internships I found:";
const CHALLENGES_HEADING: &str = "Here are some Alabama tech challenges that might interest you:";
const GENERAL_HEADING: &str =
    "Here are some opportunities and challenges from the Alabama tech community that may be relevant:";

const FOLLOW_UP_HINT: &str = "If one of these interests you, reply with something like \
\"I'm interested in option 1\" or mention its title.";

const NO_CONTEXT_MARKER: &str = "No specific context";

static GENERAL_KNOWLEDGE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"what.*capital",
        r"tell me.*joke",
        r"what.*weather",
        r"who.*president",
        r"what.*population",
        r"how.*many.*people",
        r"what.*date",
        r"what.*time",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const COMMUNITY_KEYWORDS: &[&str] = &[
    "challenge",
    "internship",
    "opportunity",
    "event",
    "tech",
    "alabama",
    "community",
];

const QUESTION_WORDS: &[&str] = &["what", "who", "when", "where", "why", "how"];

const ORDINAL: &str = "(1|2|3|4|5|first|second|third|fourth|fifth|one|two|three|four|five)";

static OPTION_SELECTION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"\b(option|choice|pick|select|choose|want|interested).*\b{ORDINAL}\b"),
        format!(r"\b(the|that)\s+{ORDINAL}\b"),
        r"\b(1|2|3|4|5|first|second|third|fourth|fifth)\b.*(challenge|internship|opportunity|event)"
            .to_string(),
        r"\bnumber\s+(1|2|3|4|5)\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// General-knowledge question outside the community's scope.
    OutOfScope,
    /// Nothing in the catalog matched.
    NoContext,
    /// Picking an item from a list sent earlier.
    SelectOption,
    /// Browsing; the heading depends on the topic.
    Browse(Topic),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Jobs,
    Challenges,
    General,
}

/// Classify a spelling-corrected query against the retrieved context.
pub fn classify(query: &str, context: Option<&str>) -> Intent {
    let lowered = query.to_lowercase();

    if is_out_of_scope(&lowered) {
        return Intent::OutOfScope;
    }
    let has_context = context
        .map(str::trim)
        .is_some_and(|c| !c.is_empty() && !c.contains(NO_CONTEXT_MARKER));
    if !has_context {
        return Intent::NoContext;
    }
    if OPTION_SELECTION.iter().any(|re| re.is_match(&lowered)) {
        return Intent::SelectOption;
    }

    let topic = if ["job", "intern", "opportunit"].iter().any(|w| lowered.contains(w)) {
        Topic::Jobs
    } else if lowered.contains("challenge") {
        Topic::Challenges
    } else {
        Topic::General
    };
    Intent::Browse(topic)
}

fn is_out_of_scope(lowered: &str) -> bool {
    if GENERAL_KNOWLEDGE.iter().any(|re| re.is_match(lowered)) {
        return true;
    }
    !COMMUNITY_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        && QUESTION_WORDS.iter().any(|qw| lowered.starts_with(qw))
}

fn render(intent: Intent, context: Option<&str>) -> String {
    let heading = match intent {
        Intent::OutOfScope => return OUT_OF_SCOPE_REPLY.to_string(),
        Intent::NoContext => return NOT_FOUND_REPLY.to_string(),
        Intent::SelectOption => return SELECTION_REPLY.to_string(),
        Intent::Browse(Topic::Jobs) => JOBS_HEADING,
        Intent::Browse(Topic::Challenges) => CHALLENGES_HEADING,
        Intent::Browse(Topic::General) => GENERAL_HEADING,
    };
    format!(
        "{heading}\n\n{}\n\n{FOLLOW_UP_HINT}",
        context.unwrap_or_default().trim()
    )
}

/// Reply generator built from keyword rules and the retrieved context.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedReplyGenerator;

#[async_trait]
impl ReplyGenerator for RuleBasedReplyGenerator {
    async fn generate(
        &self,
        text: &str,
        context: Option<&str>,
        user_id: Option<&UserId>,
    ) -> Result<Reply, ChipError> {
        let query = correct_typos(text, true);
        let intent = classify(&query, context);
        debug!(?intent, "classified message");

        Ok(Reply {
            text: render(intent, context),
            submission: user_id.and_then(|_| detect_submission(text, context)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str =
        "1. Smart Parking Challenge (challenge, ID: 3f2b8c1e-4d5a-4b6c-9e7f-0a1b2c3d4e5f): Build it";

    #[test]
    fn general_knowledge_is_out_of_scope() {
        assert_eq!(classify("What is the capital of France?", Some(CONTEXT)), Intent::OutOfScope);
        assert_eq!(classify("tell me a joke", Some(CONTEXT)), Intent::OutOfScope);
        assert_eq!(classify("why is the sky blue", Some(CONTEXT)), Intent::OutOfScope);
    }

    #[test]
    fn community_question_is_in_scope() {
        assert_eq!(
            classify("what challenges are open", Some(CONTEXT)),
            Intent::Browse(Topic::Challenges)
        );
        assert_eq!(
            classify("where can I find an internship", Some(CONTEXT)),
            Intent::Browse(Topic::Jobs)
        );
        assert_eq!(classify("hackathons near me", Some(CONTEXT)), Intent::Browse(Topic::General));
    }

    #[test]
    fn missing_context_is_not_found() {
        assert_eq!(classify("any challenges?", None), Intent::NoContext);
        assert_eq!(classify("any challenges?", Some("  ")), Intent::NoContext);
        assert_eq!(
            classify("any challenges?", Some("No specific context found.")),
            Intent::NoContext
        );
    }

    #[test]
    fn option_selection() {
        for text in [
            "I'm interested in option 2",
            "the second one please",
            "number 3",
            "first challenge sounds fun",
        ] {
            assert_eq!(classify(text, Some(CONTEXT)), Intent::SelectOption, "{text}");
        }
    }

    #[tokio::test]
    async fn browse_reply_wraps_context() {
        let reply = RuleBasedReplyGenerator
            .generate("any new challege?", Some(CONTEXT), None)
            .await
            .unwrap();
        assert!(reply.text.starts_with(CHALLENGES_HEADING));
        assert!(reply.text.contains(CONTEXT));
        assert!(reply.text.ends_with(FOLLOW_UP_HINT));
        assert!(reply.submission.is_none());
    }

    #[tokio::test]
    async fn shorthand_question_is_understood() {
        let reply = RuleBasedReplyGenerator
            .generate("wht is the weather", Some(CONTEXT), None)
            .await
            .unwrap();
        assert_eq!(reply.text, OUT_OF_SCOPE_REPLY);
    }

    #[tokio::test]
    async fn submission_needs_a_known_user() {
        let text = "I submitted the parking challenge";
        let anonymous = RuleBasedReplyGenerator.generate(text, Some(CONTEXT), None).await.unwrap();
        assert!(anonymous.submission.is_none());

        let user = UserId("u-1".into());
        let known = RuleBasedReplyGenerator
            .generate(text, Some(CONTEXT), Some(&user))
            .await
            .unwrap();
        let draft = known.submission.unwrap();
        assert_eq!(draft.challenge_id, "3f2b8c1e-4d5a-4b6c-9e7f-0a1b2c3d4e5f");
        assert_eq!(draft.submission_text, text);
    }
}

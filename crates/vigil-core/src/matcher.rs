//! Tag and custom-keyword matching.
//!
//! Produces an allow/deny verdict plus the matched reason for one event
//! against a rule's active tags and keywords. Custom keywords are a supreme
//! override and are checked before any tag logic; tags are evaluated in the
//! fixed priority order of [`Category::priority_order`], first match wins.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::event::Event;
use crate::patterns::{library, PatternLibrary};

/// Reason string reported for custom-keyword matches.
pub const CUSTOM_RULE_REASON: &str = "custom-rule";

/// Outcome of matching one event against a rule's tags and keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// True when a keyword or active tag matched.
    pub allowed: bool,
    /// The matched tag's display name, `"custom-rule"`, or empty.
    pub reason: String,
    /// The matched tag, when one matched.
    pub tag: Option<Category>,
}

impl MatchOutcome {
    /// A match on a custom keyword.
    pub fn custom() -> Self {
        Self {
            allowed: true,
            reason: CUSTOM_RULE_REASON.to_string(),
            tag: None,
        }
    }

    /// A match on an active tag.
    pub fn tag(tag: Category) -> Self {
        Self {
            allowed: true,
            reason: tag.name().to_string(),
            tag: Some(tag),
        }
    }

    /// No keyword or tag matched.
    pub fn no_match() -> Self {
        Self {
            allowed: false,
            reason: String::new(),
            tag: None,
        }
    }
}

/// Evaluates events against active tags and custom keywords.
pub struct TagMatcher {
    library: &'static PatternLibrary,
}

impl TagMatcher {
    /// Creates a matcher over the process-wide pattern library.
    pub fn new() -> Self {
        Self { library: library() }
    }

    /// Evaluates one event.
    ///
    /// 1. Custom keywords first: any non-empty, trimmed, comma-delimited
    ///    token that is a case-insensitive substring of the combined text
    ///    short-circuits everything else.
    /// 2. No active tags: no match.
    /// 3. Tags in priority order; the first whose conditions hold wins.
    pub fn evaluate(
        &self,
        event: &Event,
        active_tags: &HashSet<Category>,
        custom_keywords: &[String],
    ) -> MatchOutcome {
        let text = event.combined_text();

        if self.keyword_matches(&text, custom_keywords) {
            return MatchOutcome::custom();
        }

        if active_tags.is_empty() {
            return MatchOutcome::no_match();
        }

        for tag in Category::priority_order() {
            if active_tags.contains(tag) && self.tag_matches(*tag, event, &text) {
                return MatchOutcome::tag(*tag);
            }
        }

        MatchOutcome::no_match()
    }

    fn keyword_matches(&self, text: &str, custom_keywords: &[String]) -> bool {
        if custom_keywords.is_empty() {
            return false;
        }

        let haystack = text.to_lowercase();
        custom_keywords
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .any(|token| haystack.contains(&token.to_lowercase()))
    }

    fn tag_matches(&self, tag: Category, event: &Event, text: &str) -> bool {
        match tag {
            // Direct messages need a non-group signal plus either the
            // platform conversation flag or direct patterns with no group
            // indicators present.
            Category::DirectChats => {
                !event.is_group_digest
                    && (event.is_conversation
                        || (!self.library.has_group_indicators(text)
                            && self.library.matches_tag(Category::DirectChats, text)))
            }
            Category::GroupThreads => {
                event.is_group_digest || self.library.matches_tag(Category::GroupThreads, text)
            }
            // Mentions match irrespective of the group/direct distinction.
            Category::Mentions => self.library.matches_tag(Category::Mentions, text),
            _ => self.library.matches_tag(tag, text),
        }
    }
}

impl Default for TagMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> TagMatcher {
        TagMatcher::new()
    }

    fn tags(list: &[Category]) -> HashSet<Category> {
        list.iter().copied().collect()
    }

    fn event(title: &str, body: &str) -> Event {
        Event::new("chat.app", title, body, 0)
    }

    // === Custom keyword tests ===

    #[test]
    fn custom_keyword_is_supreme_override() {
        let outcome = matcher().evaluate(
            &event("Promo Team", "project phoenix launch discount"),
            &tags(&[]),
            &["project phoenix".to_string()],
        );
        assert!(outcome.allowed);
        assert_eq!(outcome.reason, CUSTOM_RULE_REASON);
    }

    #[test]
    fn custom_keywords_split_and_trim() {
        let outcome = matcher().evaluate(
            &event("Alert", "the shipment arrived"),
            &tags(&[]),
            &[" , shipment ,  ".to_string()],
        );
        assert!(outcome.allowed);
    }

    #[test]
    fn custom_keywords_case_insensitive() {
        let outcome = matcher().evaluate(
            &event("Note", "URGENT DELIVERY"),
            &tags(&[]),
            &["urgent delivery".to_string()],
        );
        assert!(outcome.allowed);
    }

    #[test]
    fn empty_keyword_tokens_never_match() {
        let outcome = matcher().evaluate(
            &event("Note", "anything at all"),
            &tags(&[]),
            &[" , ,".to_string()],
        );
        assert!(!outcome.allowed);
    }

    #[test]
    fn keyword_checked_before_tags() {
        // Finance patterns match too, but the keyword reason wins.
        let outcome = matcher().evaluate(
            &event("Bank", "payment received for rent"),
            &tags(&[Category::Finance]),
            &["rent".to_string()],
        );
        assert_eq!(outcome.reason, CUSTOM_RULE_REASON);
    }

    // === Tag priority tests ===

    #[test]
    fn no_active_tags_no_match() {
        let outcome = matcher().evaluate(
            &event("Alex", "sent you a message"),
            &tags(&[]),
            &[],
        );
        assert!(!outcome.allowed);
        assert!(outcome.reason.is_empty());
    }

    #[test]
    fn finance_beats_promotions_when_both_match() {
        let outcome = matcher().evaluate(
            &event("Shop", "payment received, plus 50% off your next order"),
            &tags(&[Category::Promotions, Category::Finance]),
            &[],
        );
        assert!(outcome.allowed);
        assert_eq!(outcome.tag, Some(Category::Finance));
        assert_eq!(outcome.reason, "Finance");
    }

    #[test]
    fn inactive_tag_never_matches() {
        let outcome = matcher().evaluate(
            &event("Shop", "50% off today only!"),
            &tags(&[Category::DirectChats]),
            &[],
        );
        assert!(!outcome.allowed);
    }

    // === Direct message tests ===

    #[test]
    fn direct_message_pattern_allows() {
        let outcome = matcher().evaluate(
            &event("Alex", "sent you a message"),
            &tags(&[Category::DirectChats]),
            &[],
        );
        assert!(outcome.allowed);
        assert_eq!(outcome.reason, "Direct Message");
    }

    #[test]
    fn group_digest_suppresses_direct_message() {
        let e = event("Family", "sent you a message").with_group_digest(true);
        let outcome = matcher().evaluate(&e, &tags(&[Category::DirectChats]), &[]);
        assert!(!outcome.allowed);
    }

    #[test]
    fn group_indicators_suppress_direct_message() {
        let outcome = matcher().evaluate(
            &event("Family", "3 new messages in Family group chat"),
            &tags(&[Category::DirectChats]),
            &[],
        );
        assert!(!outcome.allowed);
    }

    #[test]
    fn conversation_flag_allows_without_patterns() {
        let e = event("Alex", "ok see you then").with_conversation(true);
        let outcome = matcher().evaluate(&e, &tags(&[Category::DirectChats]), &[]);
        assert!(outcome.allowed);
        assert_eq!(outcome.tag, Some(Category::DirectChats));
    }

    #[test]
    fn group_digest_beats_conversation_flag() {
        let e = event("Family", "chatter")
            .with_conversation(true)
            .with_group_digest(true);
        let outcome = matcher().evaluate(&e, &tags(&[Category::DirectChats]), &[]);
        assert!(!outcome.allowed);
    }

    #[test]
    fn group_digest_matches_group_threads() {
        let e = event("Family", "chatter").with_group_digest(true);
        let outcome = matcher().evaluate(&e, &tags(&[Category::GroupThreads]), &[]);
        assert!(outcome.allowed);
        assert_eq!(outcome.tag, Some(Category::GroupThreads));
    }

    #[test]
    fn mentions_match_inside_group_text() {
        let outcome = matcher().evaluate(
            &event("Design Team", "Kim mentioned you in the group"),
            &tags(&[Category::Mentions]),
            &[],
        );
        assert!(outcome.allowed);
        assert_eq!(outcome.tag, Some(Category::Mentions));
    }

    #[test]
    fn mentions_beat_calls_by_priority() {
        // Both Personal Inbox tags; Mentions is listed before Calls.
        let outcome = matcher().evaluate(
            &event("Team", "Kim mentioned you about the missed call"),
            &tags(&[Category::Calls, Category::Mentions]),
            &[],
        );
        assert_eq!(outcome.tag, Some(Category::Mentions));
    }

    #[test]
    fn security_beats_personal_inbox() {
        let outcome = matcher().evaluate(
            &event("Mail", "verification code from Alex who messaged you"),
            &tags(&[Category::DirectChats, Category::Security]),
            &[],
        );
        assert_eq!(outcome.tag, Some(Category::Security));
    }

    #[test]
    fn nothing_matches_promotional_text_without_promotions_tag() {
        let outcome = matcher().evaluate(
            &event("Promo Team", "50% off today only!"),
            &tags(&[Category::DirectChats]),
            &[],
        );
        assert!(!outcome.allowed);
        assert!(outcome.reason.is_empty());
    }
}

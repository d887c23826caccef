//! Per-source filtering rules.
//!
//! One [`Rule`] exists per (source, profile) pair. A source with no rule is
//! never filtered: the pipeline allows it before the state machine runs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Blanket filtering behavior for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShieldLevel {
    /// Everything is delivered, independent of category.
    Open,
    /// Deliver only what the rule's tags, keywords, or resolved category
    /// allow.
    #[default]
    Smart,
    /// Everything is suppressed except critical content.
    Fortress,
    /// Degenerate state: no filtering.
    None,
}

impl ShieldLevel {
    /// Stable identifier used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShieldLevel::Open => "open",
            ShieldLevel::Smart => "smart",
            ShieldLevel::Fortress => "fortress",
            ShieldLevel::None => "none",
        }
    }

    /// Parse from a stable identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ShieldLevel::Open),
            "smart" => Some(ShieldLevel::Smart),
            "fortress" => Some(ShieldLevel::Fortress),
            "none" => Some(ShieldLevel::None),
            _ => None,
        }
    }

    /// Parse leniently: unknown values (e.g. persisted by a prior version)
    /// fall back to the safe default rather than failing the load.
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Returns true when this level filters at all.
    pub fn is_filtering(&self) -> bool {
        matches!(self, ShieldLevel::Smart | ShieldLevel::Fortress)
    }
}

impl std::fmt::Display for ShieldLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A per-source filtering rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Source application identifier.
    pub source: String,
    /// Owning profile.
    pub profile_id: String,
    /// Blanket behavior for this source.
    pub shield_level: ShieldLevel,
    /// Categories the user wants delivered. Never contains `Critical`.
    pub active_tags: HashSet<Category>,
    /// User-supplied keyword overrides, in the order entered.
    pub custom_keywords: Vec<String>,
    /// Last modification time, epoch milliseconds.
    pub last_updated: i64,
}

impl Rule {
    /// Creates a rule with the given level and no tags or keywords.
    pub fn new(
        source: impl Into<String>,
        profile_id: impl Into<String>,
        shield_level: ShieldLevel,
    ) -> Self {
        Self {
            source: source.into(),
            profile_id: profile_id.into(),
            shield_level,
            active_tags: HashSet::new(),
            custom_keywords: Vec::new(),
            last_updated: 0,
        }
    }

    /// Sets the active tag set. `Critical` is silently dropped: it is a
    /// pseudo-category, not a tag.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Category>) -> Self {
        self.active_tags = tags.into_iter().filter(|t| !t.is_critical()).collect();
        self
    }

    /// Sets the custom keywords.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = String>) -> Self {
        self.custom_keywords = keywords.into_iter().collect();
        self
    }

    /// Sets the last-updated timestamp.
    pub fn with_last_updated(mut self, last_updated: i64) -> Self {
        self.last_updated = last_updated;
        self
    }

    /// Inserts one tag, ignoring `Critical`.
    pub fn add_tag(&mut self, tag: Category) {
        if !tag.is_critical() {
            self.active_tags.insert(tag);
        }
    }

    /// Returns true if the given tag is active on this rule.
    pub fn has_tag(&self, tag: Category) -> bool {
        self.active_tags.contains(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shield_level_roundtrip() {
        for level in [
            ShieldLevel::Open,
            ShieldLevel::Smart,
            ShieldLevel::Fortress,
            ShieldLevel::None,
        ] {
            assert_eq!(ShieldLevel::parse(level.as_str()), Some(level));
        }
    }

    #[test]
    fn unknown_level_falls_back_to_smart() {
        assert_eq!(ShieldLevel::parse("paranoid"), None);
        assert_eq!(ShieldLevel::parse_lenient("paranoid"), ShieldLevel::Smart);
    }

    #[test]
    fn default_level_is_smart() {
        assert_eq!(ShieldLevel::default(), ShieldLevel::Smart);
    }

    #[test]
    fn filtering_levels() {
        assert!(ShieldLevel::Smart.is_filtering());
        assert!(ShieldLevel::Fortress.is_filtering());
        assert!(!ShieldLevel::Open.is_filtering());
        assert!(!ShieldLevel::None.is_filtering());
    }

    #[test]
    fn with_tags_drops_critical() {
        let rule = Rule::new("chat.app", "default", ShieldLevel::Smart)
            .with_tags([Category::Critical, Category::DirectChats]);
        assert!(!rule.has_tag(Category::Critical));
        assert!(rule.has_tag(Category::DirectChats));
    }

    #[test]
    fn add_tag_ignores_critical() {
        let mut rule = Rule::new("chat.app", "default", ShieldLevel::Smart);
        rule.add_tag(Category::Critical);
        rule.add_tag(Category::Finance);
        assert_eq!(rule.active_tags.len(), 1);
        assert!(rule.has_tag(Category::Finance));
    }

    #[test]
    fn serde_roundtrip() {
        let rule = Rule::new("mail.app", "kid", ShieldLevel::Fortress)
            .with_tags([Category::Security])
            .with_keywords(vec!["package".to_string()])
            .with_last_updated(1_700_000_000_000);
        let json = serde_json::to_string(&rule).unwrap();
        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, "mail.app");
        assert_eq!(back.shield_level, ShieldLevel::Fortress);
        assert!(back.has_tag(Category::Security));
        assert_eq!(back.custom_keywords, vec!["package".to_string()]);
    }
}

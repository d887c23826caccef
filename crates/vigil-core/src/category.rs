//! Notification categories.
//!
//! A [`Category`] is both a user-facing allow-list entry (an "active tag" on
//! a rule) and a classifier output value. The vocabulary is fixed at compile
//! time. [`Category::Critical`] is a pseudo-category: it is never
//! user-selectable, never cached, and always breaks through blocking.

use serde::{Deserialize, Serialize};

/// Notification content categories.
///
/// The 19 selectable tags are grouped into five families; the family order
/// defines matching priority (see [`Category::priority_order`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Safety-critical content. Pseudo-category, not user-selectable.
    Critical,
    /// Security alerts (logins, verification codes, account changes).
    Security,
    /// Financial activity (payments, transfers, invoices).
    Finance,
    /// Emergency broadcasts and urgent warnings.
    Emergency,
    /// One-to-one messages.
    DirectChats,
    /// Group conversations and digests.
    GroupThreads,
    /// Mentions and replies addressed to the user.
    Mentions,
    /// Incoming, missed, and video calls.
    Calls,
    /// General work activity.
    Work,
    /// Meeting invites and reminders.
    Meetings,
    /// Document shares and edits.
    Documents,
    /// File storage and sync activity.
    Storage,
    /// Smart-home devices.
    SmartHome,
    /// Health and fitness.
    Health,
    /// Rides, deliveries, and transit.
    Transport,
    /// Orders and shipping.
    Shopping,
    /// Media and entertainment.
    Entertainment,
    /// News headlines.
    News,
    /// App and system updates.
    Updates,
    /// Marketing and promotional content.
    Promotions,
}

/// Category families, in priority order (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Security, Finance, Emergency.
    SafetyFinance,
    /// DirectChats, GroupThreads, Mentions, Calls.
    PersonalInbox,
    /// Work, Meetings, Documents, Storage.
    WorkPlanning,
    /// SmartHome, Health, Transport, Shopping.
    ActivityHome,
    /// Entertainment, News, Updates, Promotions.
    ContentAwareness,
}

impl Category {
    /// All user-selectable tags in fixed priority order.
    ///
    /// Ties between simultaneously matching tags are always broken in favor
    /// of the earliest entry here. `Critical` is excluded; it is not a tag.
    pub fn priority_order() -> &'static [Category] {
        &[
            // Safety & Finance
            Category::Security,
            Category::Finance,
            Category::Emergency,
            // Personal Inbox
            Category::DirectChats,
            Category::GroupThreads,
            Category::Mentions,
            Category::Calls,
            // Work & Planning
            Category::Work,
            Category::Meetings,
            Category::Documents,
            Category::Storage,
            // Activity & Home
            Category::SmartHome,
            Category::Health,
            Category::Transport,
            Category::Shopping,
            // Content & Awareness
            Category::Entertainment,
            Category::News,
            Category::Updates,
            Category::Promotions,
        ]
    }

    /// Returns the family this category belongs to, or `None` for `Critical`.
    pub fn family(&self) -> Option<Family> {
        match self {
            Category::Critical => None,
            Category::Security | Category::Finance | Category::Emergency => {
                Some(Family::SafetyFinance)
            }
            Category::DirectChats
            | Category::GroupThreads
            | Category::Mentions
            | Category::Calls => Some(Family::PersonalInbox),
            Category::Work | Category::Meetings | Category::Documents | Category::Storage => {
                Some(Family::WorkPlanning)
            }
            Category::SmartHome
            | Category::Health
            | Category::Transport
            | Category::Shopping => Some(Family::ActivityHome),
            Category::Entertainment
            | Category::News
            | Category::Updates
            | Category::Promotions => Some(Family::ContentAwareness),
        }
    }

    /// Returns true for the critical pseudo-category.
    pub fn is_critical(&self) -> bool {
        matches!(self, Category::Critical)
    }

    /// Categories that are inherently urgent when the user has opted in.
    ///
    /// Used by the rescue trigger's two-key check.
    pub fn is_inherently_urgent(&self) -> bool {
        matches!(
            self,
            Category::Security | Category::Finance | Category::Emergency
        )
    }

    /// Stable identifier used in storage and the classifier label table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Critical => "critical",
            Category::Security => "security",
            Category::Finance => "finance",
            Category::Emergency => "emergency",
            Category::DirectChats => "direct_chats",
            Category::GroupThreads => "group_threads",
            Category::Mentions => "mentions",
            Category::Calls => "calls",
            Category::Work => "work",
            Category::Meetings => "meetings",
            Category::Documents => "documents",
            Category::Storage => "storage",
            Category::SmartHome => "smart_home",
            Category::Health => "health",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::News => "news",
            Category::Updates => "updates",
            Category::Promotions => "promotions",
        }
    }

    /// Parse from a stable identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Category::Critical),
            "security" => Some(Category::Security),
            "finance" => Some(Category::Finance),
            "emergency" => Some(Category::Emergency),
            "direct_chats" => Some(Category::DirectChats),
            "group_threads" => Some(Category::GroupThreads),
            "mentions" => Some(Category::Mentions),
            "calls" => Some(Category::Calls),
            "work" => Some(Category::Work),
            "meetings" => Some(Category::Meetings),
            "documents" => Some(Category::Documents),
            "storage" => Some(Category::Storage),
            "smart_home" => Some(Category::SmartHome),
            "health" => Some(Category::Health),
            "transport" => Some(Category::Transport),
            "shopping" => Some(Category::Shopping),
            "entertainment" => Some(Category::Entertainment),
            "news" => Some(Category::News),
            "updates" => Some(Category::Updates),
            "promotions" => Some(Category::Promotions),
            _ => None,
        }
    }

    /// Human-readable name, used as the matcher's reason string.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Critical => "Critical Alert",
            Category::Security => "Security",
            Category::Finance => "Finance",
            Category::Emergency => "Emergency",
            Category::DirectChats => "Direct Message",
            Category::GroupThreads => "Group Threads",
            Category::Mentions => "Mentions",
            Category::Calls => "Calls",
            Category::Work => "Work",
            Category::Meetings => "Meetings",
            Category::Documents => "Documents",
            Category::Storage => "Storage",
            Category::SmartHome => "Smart Home",
            Category::Health => "Health",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::News => "News",
            Category::Updates => "Updates",
            Category::Promotions => "Promotions",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_has_all_selectable_tags() {
        let order = Category::priority_order();
        assert_eq!(order.len(), 19);
        assert!(!order.contains(&Category::Critical));
    }

    #[test]
    fn priority_order_leads_with_safety_finance() {
        let order = Category::priority_order();
        assert_eq!(order[0], Category::Security);
        assert_eq!(order[1], Category::Finance);
        assert_eq!(order[2], Category::Emergency);
    }

    #[test]
    fn finance_ranks_above_promotions() {
        let order = Category::priority_order();
        let finance = order.iter().position(|c| *c == Category::Finance).unwrap();
        let promos = order
            .iter()
            .position(|c| *c == Category::Promotions)
            .unwrap();
        assert!(finance < promos);
    }

    #[test]
    fn family_grouping() {
        assert_eq!(Category::Security.family(), Some(Family::SafetyFinance));
        assert_eq!(Category::DirectChats.family(), Some(Family::PersonalInbox));
        assert_eq!(Category::Meetings.family(), Some(Family::WorkPlanning));
        assert_eq!(Category::Transport.family(), Some(Family::ActivityHome));
        assert_eq!(Category::Promotions.family(), Some(Family::ContentAwareness));
        assert_eq!(Category::Critical.family(), None);
    }

    #[test]
    fn critical_is_not_inherently_urgent_tag() {
        // Critical has its own unconditional path; the urgent set is the
        // opt-in second key only.
        assert!(Category::Security.is_inherently_urgent());
        assert!(Category::Finance.is_inherently_urgent());
        assert!(Category::Emergency.is_inherently_urgent());
        assert!(!Category::DirectChats.is_inherently_urgent());
    }

    #[test]
    fn as_str_parse_roundtrip() {
        for cat in Category::priority_order() {
            assert_eq!(Category::parse(cat.as_str()), Some(*cat));
        }
        assert_eq!(Category::parse("critical"), Some(Category::Critical));
        assert_eq!(Category::parse("bogus"), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Category::SmartHome).unwrap(),
            "\"smart_home\""
        );
        let cat: Category = serde_json::from_str("\"direct_chats\"").unwrap();
        assert_eq!(cat, Category::DirectChats);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Category::GroupThreads.to_string(), "group_threads");
    }
}

//! Event and decision types.
//!
//! An [`Event`] is constructed per incoming notification and consumed by the
//! pipeline; it is never stored by the core. The pipeline returns a
//! [`Decision`] to the caller.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// An incoming notification event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Source application identifier (e.g. package or bundle id).
    pub source: String,
    /// Notification title. For conversation notifications this carries the
    /// sender display name.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// True when the notification summarizes a group conversation.
    pub is_group_digest: bool,
    /// True when the platform flagged this as a conversation notification.
    pub is_conversation: bool,
    /// Arrival time, epoch milliseconds.
    pub timestamp: i64,
}

impl Event {
    /// Creates a new event with the given arrival time.
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            body: body.into(),
            is_group_digest: false,
            is_conversation: false,
            timestamp,
        }
    }

    /// Creates an event stamped with the current time.
    pub fn now(
        source: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(source, title, body, chrono::Utc::now().timestamp_millis())
    }

    /// Marks this event as a group digest.
    pub fn with_group_digest(mut self, is_group_digest: bool) -> Self {
        self.is_group_digest = is_group_digest;
        self
    }

    /// Marks this event as a conversation notification.
    pub fn with_conversation(mut self, is_conversation: bool) -> Self {
        self.is_conversation = is_conversation;
        self
    }

    /// Title and body concatenated with a single space, as matched by the
    /// pattern library.
    pub fn combined_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.body.len() + 1);
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.body);
        text
    }
}

/// Final verdict for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Deliver the event normally.
    Allow,
    /// Suppress the event.
    Block,
}

/// The pipeline's decision for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Deliver or suppress.
    pub verdict: Verdict,
    /// True when the event must be force-surfaced through the urgent
    /// side channel (blocked) or styled as urgent (allowed critical).
    pub rescued: bool,
    /// Resolved category, when one was determined.
    pub category: Option<Category>,
    /// Why the verdict was reached (tag name, "custom-rule", or empty).
    pub reason: String,
}

impl Decision {
    /// An allow with no category and no reason (unfiltered pass-through).
    pub fn pass_through() -> Self {
        Self {
            verdict: Verdict::Allow,
            rescued: false,
            category: None,
            reason: String::new(),
        }
    }

    /// An allow with the given reason.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Allow,
            rescued: false,
            category: None,
            reason: reason.into(),
        }
    }

    /// An allow carrying a resolved category.
    pub fn allow_with_category(category: Category) -> Self {
        Self {
            verdict: Verdict::Allow,
            rescued: false,
            category: Some(category),
            reason: category.name().to_string(),
        }
    }

    /// The fast-critical terminal verdict: allowed, flagged for rescue.
    pub fn critical() -> Self {
        Self {
            verdict: Verdict::Allow,
            rescued: true,
            category: Some(Category::Critical),
            reason: Category::Critical.name().to_string(),
        }
    }

    /// A block with an optionally resolved category.
    pub fn block(category: Option<Category>, rescued: bool) -> Self {
        Self {
            verdict: Verdict::Block,
            rescued,
            category,
            reason: category.map(|c| c.name().to_string()).unwrap_or_default(),
        }
    }

    /// Returns true if the verdict is Allow.
    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allow
    }

    /// Returns true if the verdict is Block.
    pub fn is_blocked(&self) -> bool {
        self.verdict == Verdict::Block
    }
}

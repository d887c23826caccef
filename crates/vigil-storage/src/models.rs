//! Data models for storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::Category;

/// A blocked event as persisted (privacy-preserving: stores a truncated
/// preview and a content hash, not the full body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier.
    pub id: i64,
    /// Source application.
    pub source: String,
    /// Notification title.
    pub title: String,
    /// Truncated body preview.
    pub preview: String,
    /// SHA-256 hash of the combined content (for deduplication).
    pub content_hash: String,
    /// Resolved category, if one was determined.
    pub category: Option<Category>,
    /// Whether the event was blocked. Always true for appended records;
    /// kept explicit because the row shape is event + verdict.
    pub is_blocked: bool,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a new record.
#[derive(Debug, Clone)]
pub struct NewRecord {
    /// Source application.
    pub source: String,
    /// Notification title.
    pub title: String,
    /// Truncated body preview.
    pub preview: String,
    /// SHA-256 hash of the combined content.
    pub content_hash: String,
    /// Resolved category.
    pub category: Option<Category>,
    /// Whether the event was blocked.
    pub is_blocked: bool,
}

/// Per-category count of blocked records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category.
    pub category: Category,
    /// Number of blocked records with that category.
    pub count: i64,
}

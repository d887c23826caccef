//! High-level database interface.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use tracing::info;
use vigil_core::{Category, CoreError, Event, RecordStore, Rule, RuleStore};

use crate::error::{Result, StorageError};
use crate::models::{CategoryCount, NewRecord, Record};
use crate::pool::ConnectionPool;
use crate::repository::{create_preview, hash_content, RecordsRepo, RulesRepo};

/// High-level database interface for Vigil.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Create a new database in the default app data directory.
    pub fn new() -> Result<Self> {
        let path = Self::default_db_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create a new database at a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let pool = ConnectionPool::in_memory()?;
        Ok(Self { pool })
    }

    /// Get the default database path.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "vigil", "vigil")
            .ok_or_else(|| StorageError::Config("Could not determine app data directory".into()))?;

        Ok(proj_dirs.data_dir().join("vigil.db"))
    }

    // === Rules ===

    /// Get the rule for a source under a profile.
    pub fn get_rule(&self, source: &str, profile_id: &str) -> Result<Option<Rule>> {
        let conn = self.pool.get()?;
        RulesRepo::get(&conn, source, profile_id)
    }

    /// Insert or update a rule.
    pub fn upsert_rule(&self, rule: &Rule) -> Result<()> {
        let conn = self.pool.get()?;
        RulesRepo::upsert(&conn, rule)
    }

    /// Delete the rule for a source. Returns true if a rule existed.
    pub fn delete_rule(&self, source: &str, profile_id: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        RulesRepo::delete(&conn, source, profile_id)
    }

    /// List all rules for a profile.
    pub fn list_rules(&self, profile_id: &str) -> Result<Vec<Rule>> {
        let conn = self.pool.get()?;
        RulesRepo::list(&conn, profile_id)
    }

    // === Records ===

    /// Append a record.
    pub fn append_record(&self, record: NewRecord) -> Result<i64> {
        let conn = self.pool.get()?;
        RecordsRepo::insert(&conn, record)
    }

    /// Get a record by ID.
    pub fn get_record(&self, id: i64) -> Result<Option<Record>> {
        let conn = self.pool.get()?;
        RecordsRepo::get_by_id(&conn, id)
    }

    /// List blocked records, optionally for one source.
    pub fn list_blocked(
        &self,
        source: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Record>> {
        let conn = self.pool.get()?;
        RecordsRepo::list_blocked(&conn, source, limit, offset)
    }

    /// Delete records older than the given time.
    pub fn delete_older_than(&self, before: DateTime<Utc>) -> Result<i64> {
        let conn = self.pool.get()?;
        RecordsRepo::delete_older_than(&conn, before)
    }

    /// Clear all records, or all records for one source.
    pub fn clear_records(&self, source: Option<&str>) -> Result<i64> {
        let conn = self.pool.get()?;
        RecordsRepo::clear(&conn, source)
    }

    /// Per-category counts of blocked records.
    pub fn blocked_category_counts(&self) -> Result<Vec<CategoryCount>> {
        let conn = self.pool.get()?;
        RecordsRepo::category_counts(&conn)
    }
}

/// Builds the persisted shape of a blocked event: full title, truncated
/// body preview, and a content hash for deduplication.
pub fn record_from_event(event: &Event, category: Option<Category>) -> NewRecord {
    NewRecord {
        source: event.source.clone(),
        title: event.title.clone(),
        preview: create_preview(&event.body),
        content_hash: hash_content(&event.combined_text()),
        category,
        is_blocked: true,
    }
}

impl RuleStore for Database {
    fn rule_for(&self, source: &str, profile_id: &str) -> vigil_core::Result<Option<Rule>> {
        self.get_rule(source, profile_id)
            .map_err(|err| CoreError::Store(err.to_string()))
    }
}

impl RecordStore for Database {
    fn append_blocked(&self, event: &Event, category: Option<Category>) -> vigil_core::Result<()> {
        self.append_record(record_from_event(event, category))
            .map(|_| ())
            .map_err(|err| CoreError::Store(err.to_string()))
    }
}

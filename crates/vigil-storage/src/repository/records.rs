//! Records repository.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use sha2::{Digest, Sha256};
use vigil_core::Category;

use crate::error::Result;
use crate::models::{CategoryCount, NewRecord, Record};

/// Maximum preview length in characters.
const PREVIEW_MAX_LEN: usize = 120;

/// Repository for blocked-record operations.
pub struct RecordsRepo;

impl RecordsRepo {
    /// Insert a new record.
    pub fn insert(conn: &Connection, record: NewRecord) -> Result<i64> {
        conn.execute(
            "INSERT INTO records (source, title, preview, content_hash, category, is_blocked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.source,
                record.title,
                record.preview,
                record.content_hash,
                record.category.map(|c| c.as_str()),
                record.is_blocked as i32,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a record by ID.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Record>> {
        let mut stmt = conn.prepare(
            "SELECT id, source, title, preview, content_hash, category, is_blocked, created_at
             FROM records WHERE id = ?1",
        )?;

        let record = stmt.query_row([id], map_record).ok();
        Ok(record)
    }

    /// List blocked records, optionally filtered by source, newest first.
    pub fn list_blocked(
        conn: &Connection,
        source: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Record>> {
        let records = match source {
            Some(source) => {
                let mut stmt = conn.prepare(
                    "SELECT id, source, title, preview, content_hash, category, is_blocked, created_at
                     FROM records WHERE is_blocked = 1 AND source = ?1
                     ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
                )?;
                let rows: Vec<Record> = stmt
                    .query_map(params![source, limit, offset], map_record)?
                    .filter_map(|r| r.ok())
                    .collect();
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, source, title, preview, content_hash, category, is_blocked, created_at
                     FROM records WHERE is_blocked = 1
                     ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                )?;
                let rows: Vec<Record> = stmt
                    .query_map(params![limit, offset], map_record)?
                    .filter_map(|r| r.ok())
                    .collect();
                rows
            }
        };

        Ok(records)
    }

    /// Delete records older than the given time. Returns the number removed.
    pub fn delete_older_than(conn: &Connection, before: DateTime<Utc>) -> Result<i64> {
        // The cutoff is rendered in the stored datetime('now') format so the
        // comparison is exact.
        let cutoff = before.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
        let deleted = conn.execute("DELETE FROM records WHERE created_at < ?1", [cutoff])?;
        Ok(deleted as i64)
    }

    /// Delete all records, or all records for one source.
    pub fn clear(conn: &Connection, source: Option<&str>) -> Result<i64> {
        let deleted = match source {
            Some(source) => conn.execute("DELETE FROM records WHERE source = ?1", [source])?,
            None => conn.execute("DELETE FROM records", [])?,
        };
        Ok(deleted as i64)
    }

    /// Count all records.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Per-category counts of blocked records, most frequent first.
    pub fn category_counts(conn: &Connection) -> Result<Vec<CategoryCount>> {
        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*) FROM records
             WHERE is_blocked = 1 AND category IS NOT NULL
             GROUP BY category ORDER BY COUNT(*) DESC",
        )?;

        let counts = stmt
            .query_map([], |row| {
                let category: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((category, count))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(category, count)| {
                Category::parse(&category).map(|category| CategoryCount { category, count })
            })
            .collect();

        Ok(counts)
    }
}

/// Hash content using SHA-256.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Create a preview from a body (truncated, control characters stripped).
pub fn create_preview(body: &str) -> String {
    let cleaned: String = body
        .chars()
        .filter(|c| !c.is_control())
        .take(PREVIEW_MAX_LEN)
        .collect();

    if body.chars().count() > PREVIEW_MAX_LEN {
        format!("{}...", cleaned)
    } else {
        cleaned
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        source: row.get(1)?,
        title: row.get(2)?,
        preview: row.get(3)?,
        content_hash: row.get(4)?,
        category: row
            .get::<_, Option<String>>(5)?
            .and_then(|s| Category::parse(&s)),
        is_blocked: row.get::<_, i32>(6)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

/// Parse a datetime from SQLite format.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    let mut hex = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
        hex.push(HEX_CHARS[(byte & 0xf) as usize] as char);
    }
    hex
}

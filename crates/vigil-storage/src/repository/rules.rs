//! Rules repository.
//!
//! One row per (source, profile) pair. Persisted values are parsed
//! leniently: an unknown shield level or category written by another
//! version loads as the safe default instead of failing the row.

use rusqlite::{params, Connection, Row};
use vigil_core::{Category, Rule, ShieldLevel};

use crate::error::Result;

/// Repository for rule operations.
pub struct RulesRepo;

impl RulesRepo {
    /// Get the rule for a source under a profile.
    pub fn get(conn: &Connection, source: &str, profile_id: &str) -> Result<Option<Rule>> {
        let mut stmt = conn.prepare(
            "SELECT source, profile_id, shield_level, active_tags, custom_keywords, last_updated
             FROM rules WHERE source = ?1 AND profile_id = ?2",
        )?;

        let rule = stmt.query_row([source, profile_id], map_rule).ok();
        Ok(rule)
    }

    /// Insert or update the rule for its (source, profile) pair.
    pub fn upsert(conn: &Connection, rule: &Rule) -> Result<()> {
        let active_tags = serde_json::to_string(
            &rule
                .active_tags
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>(),
        )?;
        let custom_keywords = serde_json::to_string(&rule.custom_keywords)?;

        conn.execute(
            "INSERT INTO rules (source, profile_id, shield_level, active_tags, custom_keywords, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (source, profile_id) DO UPDATE SET
                 shield_level = excluded.shield_level,
                 active_tags = excluded.active_tags,
                 custom_keywords = excluded.custom_keywords,
                 last_updated = excluded.last_updated,
                 updated_at = datetime('now')",
            params![
                rule.source,
                rule.profile_id,
                rule.shield_level.as_str(),
                active_tags,
                custom_keywords,
                rule.last_updated,
            ],
        )?;

        Ok(())
    }

    /// Delete the rule for a source. Returns true if a row was removed.
    pub fn delete(conn: &Connection, source: &str, profile_id: &str) -> Result<bool> {
        let deleted = conn.execute(
            "DELETE FROM rules WHERE source = ?1 AND profile_id = ?2",
            [source, profile_id],
        )?;
        Ok(deleted > 0)
    }

    /// List all rules for a profile.
    pub fn list(conn: &Connection, profile_id: &str) -> Result<Vec<Rule>> {
        let mut stmt = conn.prepare(
            "SELECT source, profile_id, shield_level, active_tags, custom_keywords, last_updated
             FROM rules WHERE profile_id = ?1 ORDER BY source",
        )?;

        let rules = stmt
            .query_map([profile_id], map_rule)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(rules)
    }

    /// Count rules for a profile.
    pub fn count(conn: &Connection, profile_id: &str) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM rules WHERE profile_id = ?1",
            [profile_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_rule(row: &Row<'_>) -> rusqlite::Result<Rule> {
    let source: String = row.get(0)?;
    let profile_id: String = row.get(1)?;
    let shield_level: String = row.get(2)?;
    let active_tags: String = row.get(3)?;
    let custom_keywords: String = row.get(4)?;
    let last_updated: i64 = row.get(5)?;

    Ok(Rule::new(source, profile_id, ShieldLevel::parse_lenient(&shield_level))
        .with_tags(parse_tags(&active_tags))
        .with_keywords(parse_keywords(&custom_keywords))
        .with_last_updated(last_updated))
}

/// Parse a JSON tag array, skipping unknown identifiers.
fn parse_tags(json: &str) -> Vec<Category> {
    serde_json::from_str::<Vec<String>>(json)
        .unwrap_or_default()
        .iter()
        .filter_map(|s| Category::parse(s))
        .collect()
}

fn parse_keywords(json: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(json).unwrap_or_default()
}

//! Vigil Storage - SQLite persistence layer.
//!
//! This crate provides database storage for the Vigil pipeline:
//!
//! - Per-source filtering rules (one row per source and profile)
//! - Blocked-event records (privacy-preserving: previews and hashes, not
//!   full bodies)
//! - Per-category statistics over blocked records
//!
//! The [`Database`] facade implements the core's `RuleStore` and
//! `RecordStore` traits, so it plugs directly into a
//! `vigil_core::ShieldService`.
//!
//! # Example
//!
//! ```no_run
//! use vigil_core::{Category, Rule, ShieldLevel};
//! use vigil_storage::Database;
//!
//! let db = Database::in_memory().unwrap();
//!
//! let rule = Rule::new("chat.app", "default", ShieldLevel::Smart)
//!     .with_tags([Category::DirectChats]);
//! db.upsert_rule(&rule).unwrap();
//! ```

mod database;
pub mod error;
pub mod models;
mod pool;
pub mod repository;
mod schema;

pub use database::{record_from_event, Database};
pub use error::{Result, StorageError};
pub use models::{CategoryCount, NewRecord, Record};
pub use pool::ConnectionPool;
pub use repository::{create_preview, hash_content, RecordsRepo, RulesRepo};

//! Database repositories for each table.

pub mod records;
pub mod rules;

pub use records::{create_preview, hash_content, RecordsRepo};
pub use rules::RulesRepo;

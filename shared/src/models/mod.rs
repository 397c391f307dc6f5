//! Data models
//!
//! Shared between the ledger server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod customer;
pub mod document_type;
pub mod purchase;

// Re-exports
pub use customer::*;
pub use document_type::*;
pub use purchase::*;

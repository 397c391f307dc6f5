//! Document Type Model

use serde::{Deserialize, Serialize};

/// Identity document type (CC, TI, CE, PP, NIT, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DocumentType {
    pub id: i64,
    /// Short code, stored upper-case
    pub code: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create document type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTypeCreate {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

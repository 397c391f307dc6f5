//! Customer Model

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Self-declared gender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum Gender {
    #[serde(rename = "M")]
    #[cfg_attr(feature = "db", sqlx(rename = "M"))]
    Male,
    #[serde(rename = "F")]
    #[cfg_attr(feature = "db", sqlx(rename = "F"))]
    Female,
    #[serde(rename = "O")]
    #[cfg_attr(feature = "db", sqlx(rename = "O"))]
    Other,
    #[serde(rename = "N")]
    #[cfg_attr(feature = "db", sqlx(rename = "N"))]
    Undisclosed,
}

/// Customer entity joined with its document type
///
/// `last_purchase_at` and `lifetime_total` are a cache over the purchase
/// ledger and are only written by the aggregate recompute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub document_type_id: i64,
    pub document_type_code: String,
    pub document_type_name: String,
    pub document_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub email: String,
    pub phone: String,
    /// YYYY-MM-DD
    pub birth_date: String,
    pub gender: Option<Gender>,
    pub address: String,
    pub city: String,
    pub department: String,
    pub postal_code: Option<String>,
    pub is_active: bool,
    pub registered_at: i64,
    pub updated_at: i64,
    pub last_purchase_at: Option<i64>,
    pub lifetime_total: f64,
}

impl Customer {
    /// Given names followed by surnames, skipping the empty optional parts
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.first_name];
        if let Some(middle) = self.middle_name.as_deref().filter(|s| !s.is_empty()) {
            parts.push(middle);
        }
        parts.push(&self.last_name);
        if let Some(second) = self.second_last_name.as_deref().filter(|s| !s.is_empty()) {
            parts.push(second);
        }
        parts.join(" ")
    }

    /// Age in whole years at `today`, `None` when the birth date does not parse
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d").ok()?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        Some(age)
    }
}

/// Basic profile returned by the document-number lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&Customer> for CustomerProfile {
    fn from(c: &Customer) -> Self {
        Self {
            document_number: c.document_number.clone(),
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
        }
    }
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub document_type_id: i64,
    pub document_number: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub second_last_name: Option<String>,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub address: String,
    pub city: String,
    pub department: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Update customer payload
///
/// Aggregate fields are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub department: Option<String>,
    pub postal_code: Option<String>,
    pub is_active: Option<bool>,
}

/// Sortable customer list columns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerOrder {
    #[default]
    RegisteredAt,
    FirstName,
    LastName,
    DocumentNumber,
    LifetimeTotal,
    LastPurchaseAt,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Customer list filters
///
/// Without `order_by` the list is newest registration first. With it the
/// direction defaults to ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerFilter {
    pub city: Option<String>,
    pub department: Option<String>,
    pub search: Option<String>,
    /// Document type code (CC, TI, ...)
    pub document_type: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub registered_from: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub registered_to: Option<String>,
    pub order_by: Option<CustomerOrder>,
    pub direction: Option<SortDirection>,
}

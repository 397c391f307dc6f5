//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Customer errors
/// - 5xxx: Purchase errors
/// - 6xxx: Report errors
/// - 9xxx: System errors
///
/// Unassigned ranges fall back to General (below 9000) or System.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Customer and document type errors (4xxx)
    Customer,
    /// Purchase errors (5xxx)
    Purchase,
    /// Report and export errors (6xxx)
    Report,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            4000..5000 => Self::Customer,
            5000..6000 => Self::Purchase,
            6000..7000 => Self::Report,
            0..9000 => Self::General,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Customer => "customer",
            Self::Purchase => "purchase",
            Self::Report => "report",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Customer);
        assert_eq!(ErrorCategory::from_code(4104), ErrorCategory::Customer);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Purchase);
        assert_eq!(ErrorCategory::from_code(6003), ErrorCategory::Report);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(
            ErrorCode::CustomerNotFound.category(),
            ErrorCategory::Customer
        );
        assert_eq!(
            ErrorCode::PurchaseNotFound.category(),
            ErrorCategory::Purchase
        );
        assert_eq!(
            ErrorCode::NoLoyaltyCandidates.category(),
            ErrorCategory::Report
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Purchase).unwrap();
        assert_eq!(json, "\"purchase\"");

        let category: ErrorCategory = serde_json::from_str("\"report\"").unwrap();
        assert_eq!(category, ErrorCategory::Report);
    }
}

//! Unified error codes for the ledger service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Customer errors (customers, document types)
//! - 5xxx: Purchase errors
//! - 6xxx: Report errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 4001,
    /// Document number already registered
    CustomerDocumentExists = 4002,
    /// Email already registered
    CustomerEmailExists = 4003,
    /// Customer still has purchases
    CustomerHasPurchases = 4004,
    /// Document type not found
    DocumentTypeNotFound = 4101,
    /// Document type code is unknown or inactive
    DocumentTypeInvalid = 4102,
    /// Document type code already exists
    DocumentTypeCodeExists = 4103,
    /// Document type is referenced by customers
    DocumentTypeInUse = 4104,

    // ==================== 5xxx: Purchase ====================
    /// Purchase not found
    PurchaseNotFound = 5001,
    /// Order number already exists
    OrderNumberExists = 5002,
    /// Purchase amount is invalid
    PurchaseInvalidAmount = 5003,
    /// Purchase status is invalid
    PurchaseInvalidStatus = 5004,

    // ==================== 6xxx: Report ====================
    /// No customer reached the loyalty threshold
    NoLoyaltyCandidates = 6001,
    /// No customers to export
    NoCustomersToExport = 6002,
    /// Report rendering failed
    ReportRenderFailed = 6003,
    /// Report format is not supported
    ReportFormatUnsupported = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerDocumentExists => "Document number is already registered",
            ErrorCode::CustomerEmailExists => "Email is already registered",
            ErrorCode::CustomerHasPurchases => "Customer has purchases and cannot be deleted",
            ErrorCode::DocumentTypeNotFound => "Document type not found",
            ErrorCode::DocumentTypeInvalid => "Document type is not valid",
            ErrorCode::DocumentTypeCodeExists => "Document type code already exists",
            ErrorCode::DocumentTypeInUse => "Document type is in use by customers",

            // Purchase
            ErrorCode::PurchaseNotFound => "Purchase not found",
            ErrorCode::OrderNumberExists => "Order number already exists",
            ErrorCode::PurchaseInvalidAmount => "Purchase amount is invalid",
            ErrorCode::PurchaseInvalidStatus => "Purchase status is invalid",

            // Report
            ErrorCode::NoLoyaltyCandidates => "No customers reached the loyalty threshold",
            ErrorCode::NoCustomersToExport => "No customers to export",
            ErrorCode::ReportRenderFailed => "Report rendering failed",
            ErrorCode::ReportFormatUnsupported => "Report format is not supported",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Customer
            4001 => Ok(ErrorCode::CustomerNotFound),
            4002 => Ok(ErrorCode::CustomerDocumentExists),
            4003 => Ok(ErrorCode::CustomerEmailExists),
            4004 => Ok(ErrorCode::CustomerHasPurchases),
            4101 => Ok(ErrorCode::DocumentTypeNotFound),
            4102 => Ok(ErrorCode::DocumentTypeInvalid),
            4103 => Ok(ErrorCode::DocumentTypeCodeExists),
            4104 => Ok(ErrorCode::DocumentTypeInUse),

            // Purchase
            5001 => Ok(ErrorCode::PurchaseNotFound),
            5002 => Ok(ErrorCode::OrderNumberExists),
            5003 => Ok(ErrorCode::PurchaseInvalidAmount),
            5004 => Ok(ErrorCode::PurchaseInvalidStatus),

            // Report
            6001 => Ok(ErrorCode::NoLoyaltyCandidates),
            6002 => Ok(ErrorCode::NoCustomersToExport),
            6003 => Ok(ErrorCode::ReportRenderFailed),
            6004 => Ok(ErrorCode::ReportFormatUnsupported),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

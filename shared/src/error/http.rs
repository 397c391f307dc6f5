//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found (empty reports are a soft not-found)
            Self::NotFound
            | Self::CustomerNotFound
            | Self::DocumentTypeNotFound
            | Self::PurchaseNotFound
            | Self::NoLoyaltyCandidates
            | Self::NoCustomersToExport => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::CustomerDocumentExists
            | Self::CustomerEmailExists
            | Self::CustomerHasPurchases
            | Self::DocumentTypeCodeExists
            | Self::DocumentTypeInUse
            | Self::OrderNumberExists => StatusCode::CONFLICT,

            // 503 Service Unavailable
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ReportRenderFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::CustomerNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::PurchaseNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::NoLoyaltyCandidates.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::AlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::CustomerHasPurchases.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::OrderNumberExists.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ReportRenderFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::DocumentTypeInvalid.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::ReportFormatUnsupported.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}

//! Error re-exports
//!
//! API-facing errors are the shared [`AppError`]. Lower layers keep their own
//! `thiserror` enums (`RepoError`, `ReportError`) and convert into it with `?`.

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

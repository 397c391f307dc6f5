//! Utilities shared by every layer of the server
//!
//! - [`AppError`] / [`ApiResponse`] - unified error types (from `shared::error`)
//! - [`logger`] - tracing subscriber setup
//! - [`time`] - business timezone conversions
//! - [`validation`] - request payload checks

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

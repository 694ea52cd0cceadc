//! Utilities: logging setup and input validation
//!
//! Error types come from `shared::error` and are re-exported here.

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, FieldErrors};

/// A monetary total that left the Decimal range
pub fn amount_overflow() -> AppError {
    AppError::with_message(ErrorCode::ValueOutOfRange, "Amount total out of range")
}

//! Unified error system for the back-office
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`FieldErrors`]: Field-level validation messages
//! - [`ApiResponse`]: Response envelope for the presentation layer
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Account errors
//! - 2xxx: Permission errors
//! - 3xxx: Member errors
//! - 4xxx: Dues errors
//! - 5xxx: Medical expense errors
//! - 8xxx: User / role errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, FieldErrors};
//!
//! let err = AppError::new(ErrorCode::MemberNotFound);
//! assert_eq!(err.http_status(), shared::http::StatusCode::NOT_FOUND);
//!
//! let mut fields = FieldErrors::new();
//! fields.add("montant", "Le montant doit être supérieur ou égal à 0.");
//! let err = AppError::invalid_fields(&fields);
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod fields;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use fields::FieldErrors;
pub use types::{ApiResponse, AppError, AppResult};

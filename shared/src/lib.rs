//! Shared types for the association back-office
//!
//! Plain data models, the unified error system, the locale/message catalogue
//! and small utilities used by the office server and any presentation layer.

pub mod error;
pub mod i18n;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, FieldErrors};
pub use i18n::Locale;

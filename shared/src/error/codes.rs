//! Unified error codes for the back-office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Account errors
//! - 2xxx: Permission errors
//! - 3xxx: Member / locality errors
//! - 4xxx: Dues (cotisation) errors
//! - 5xxx: Medical expense and attachment errors
//! - 8xxx: User and role errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so a presentation layer in
/// any language can switch on them.
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
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Account ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Account is blocked by an administrator
    AccountLocked = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Permission key is not part of the catalogue
    UnknownPermission = 2006,

    // ==================== 3xxx: Member ====================
    /// Member not found
    MemberNotFound = 3001,
    /// Locality not found
    LocaliteNotFound = 3101,

    // ==================== 4xxx: Dues ====================
    /// Dues record not found
    CotisationNotFound = 4001,
    /// Bulk submission without any entry
    BatchEmpty = 4002,

    // ==================== 5xxx: Expenses ====================
    /// Medical expense not found
    DepenseNotFound = 5001,
    /// Attachment not found
    AttachmentNotFound = 5201,
    /// File too large
    FileTooLarge = 5202,
    /// Unsupported file format
    UnsupportedFileFormat = 5203,
    /// Empty file provided
    EmptyFile = 5204,
    /// File storage failed
    FileStorageFailed = 5205,

    // ==================== 8xxx: Users and roles ====================
    /// User not found
    UserNotFound = 8001,
    /// Role not found
    RoleNotFound = 8101,
    /// Role name already exists
    RoleNameExists = 8102,
    /// Role is still assigned to users
    RoleInUse = 8103,
    /// Reserved role cannot be deleted
    RoleIsReserved = 8104,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
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
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Account
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::AccountLocked => "Account is blocked",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::UnknownPermission => "Unknown permission key",

            // Member
            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::LocaliteNotFound => "Locality not found",

            // Dues
            ErrorCode::CotisationNotFound => "Dues record not found",
            ErrorCode::BatchEmpty => "At least one dues entry is required",

            // Expenses
            ErrorCode::DepenseNotFound => "Medical expense not found",
            ErrorCode::AttachmentNotFound => "Attachment not found",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Users and roles
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleInUse => "Role is assigned to users",
            ErrorCode::RoleIsReserved => "Reserved role cannot be deleted",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
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
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Account
            1001 => Ok(ErrorCode::NotAuthenticated),
            1006 => Ok(ErrorCode::AccountLocked),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::UnknownPermission),

            // Member
            3001 => Ok(ErrorCode::MemberNotFound),
            3101 => Ok(ErrorCode::LocaliteNotFound),

            // Dues
            4001 => Ok(ErrorCode::CotisationNotFound),
            4002 => Ok(ErrorCode::BatchEmpty),

            // Expenses
            5001 => Ok(ErrorCode::DepenseNotFound),
            5201 => Ok(ErrorCode::AttachmentNotFound),
            5202 => Ok(ErrorCode::FileTooLarge),
            5203 => Ok(ErrorCode::UnsupportedFileFormat),
            5204 => Ok(ErrorCode::EmptyFile),
            5205 => Ok(ErrorCode::FileStorageFailed),

            // Users and roles
            8001 => Ok(ErrorCode::UserNotFound),
            8101 => Ok(ErrorCode::RoleNotFound),
            8102 => Ok(ErrorCode::RoleNameExists),
            8103 => Ok(ErrorCode::RoleInUse),
            8104 => Ok(ErrorCode::RoleIsReserved),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::PermissionDenied,
            ErrorCode::CotisationNotFound,
            ErrorCode::RoleIsReserved,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_display_is_padded() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::RoleInUse.to_string(), "E8103");
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::MemberNotFound).unwrap();
        assert_eq!(json, "3001");
        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::BatchEmpty);
    }
}

//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Account errors
/// - 2xxx: Permission errors
/// - 3xxx: Member errors
/// - 4xxx: Dues errors
/// - 5xxx: Expense errors
/// - 8xxx: User / role errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Account errors (1xxx)
    Account,
    /// Permission errors (2xxx)
    Permission,
    /// Member and locality errors (3xxx)
    Member,
    /// Dues errors (4xxx)
    Dues,
    /// Medical expense errors (5xxx)
    Expense,
    /// User and role errors (8xxx)
    Role,
    /// System errors (9xxx, and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Account,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Member,
            4000..5000 => Self::Dues,
            5000..6000 => Self::Expense,
            8000..9000 => Self::Role,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Account => "account",
            Self::Permission => "permission",
            Self::Member => "member",
            Self::Dues => "dues",
            Self::Expense => "expense",
            Self::Role => "role",
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
        assert_eq!(ErrorCategory::from_code(1006), ErrorCategory::Account);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3101), ErrorCategory::Member);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Dues);
        assert_eq!(ErrorCategory::from_code(5201), ErrorCategory::Expense);
        assert_eq!(ErrorCategory::from_code(7000), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(8104), ErrorCategory::Role);
        assert_eq!(ErrorCategory::from_code(9002), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::AccountLocked.category(), ErrorCategory::Account);
        assert_eq!(
            ErrorCode::UnknownPermission.category(),
            ErrorCategory::Permission
        );
        assert_eq!(ErrorCode::BatchEmpty.category(), ErrorCategory::Dues);
        assert_eq!(ErrorCode::FileTooLarge.category(), ErrorCategory::Expense);
        assert_eq!(ErrorCode::RoleInUse.category(), ErrorCategory::Role);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Dues).unwrap();
        assert_eq!(json, "\"dues\"");
        let category: ErrorCategory = serde_json::from_str("\"expense\"").unwrap();
        assert_eq!(category, ErrorCategory::Expense);
    }
}

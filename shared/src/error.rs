//! Unified error codes for the Biblio system
//!
//! Error codes are shared between the server and API clients so callers
//! can branch on a stable numeric code instead of matching message text.
//! Codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Circulation (borrow ledger) errors
//! - 6xxx: Catalog errors
//! - 8xxx: Membership / staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values for efficient serialization and
/// cross-language compatibility (Rust, TypeScript, etc.)
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

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Manager role (or superuser) is required
    ManagerRequired = 2002,

    // ==================== 4xxx: Circulation ====================
    /// Member has reached the maximum borrow limit
    BorrowLimitExceeded = 4001,
    /// Return date is before the borrow date
    InvalidDateRange = 4002,
    /// Borrow record has already been returned
    BorrowAlreadyReturned = 4003,
    /// Borrow record is still active (or overdue) and cannot be deleted
    BorrowStillActive = 4004,

    // ==================== 6xxx: Catalog ====================
    /// No available copies left to check out
    InsufficientCopies = 6001,
    /// Check-in would exceed the total copy count
    OverReturn = 6002,
    /// Book is marked lost and cannot circulate
    BookLost = 6003,
    /// ISBN already registered
    DuplicateIsbn = 6004,
    /// Book still has non-returned borrow records
    BookHasActiveBorrows = 6005,

    // ==================== 8xxx: Membership / staff ====================
    /// Username already taken
    DuplicateUsername = 8001,
    /// Password and confirmation do not match
    PasswordMismatch = 8002,
    /// Member still holds borrowed copies
    MemberHasActiveBorrows = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
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

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::ManagerRequired => "Manager role is required",

            // Circulation
            ErrorCode::BorrowLimitExceeded => "Member has reached the borrow limit",
            ErrorCode::InvalidDateRange => "Return date is before the borrow date",
            ErrorCode::BorrowAlreadyReturned => "Borrow record has already been returned",
            ErrorCode::BorrowStillActive => "Borrow record is still active",

            // Catalog
            ErrorCode::InsufficientCopies => "No available copies to check out",
            ErrorCode::OverReturn => "Check-in would exceed the total copy count",
            ErrorCode::BookLost => "Book is marked lost",
            ErrorCode::DuplicateIsbn => "ISBN is already registered",
            ErrorCode::BookHasActiveBorrows => "Book has outstanding borrow records",

            // Membership / staff
            ErrorCode::DuplicateUsername => "Username is already taken",
            ErrorCode::PasswordMismatch => "Password and confirmation do not match",
            ErrorCode::MemberHasActiveBorrows => "Member still holds borrowed copies",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
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

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::ManagerRequired),

            // Circulation
            4001 => Ok(ErrorCode::BorrowLimitExceeded),
            4002 => Ok(ErrorCode::InvalidDateRange),
            4003 => Ok(ErrorCode::BorrowAlreadyReturned),
            4004 => Ok(ErrorCode::BorrowStillActive),

            // Catalog
            6001 => Ok(ErrorCode::InsufficientCopies),
            6002 => Ok(ErrorCode::OverReturn),
            6003 => Ok(ErrorCode::BookLost),
            6004 => Ok(ErrorCode::DuplicateIsbn),
            6005 => Ok(ErrorCode::BookHasActiveBorrows),

            // Membership / staff
            8001 => Ok(ErrorCode::DuplicateUsername),
            8002 => Ok(ErrorCode::PasswordMismatch),
            8003 => Ok(ErrorCode::MemberHasActiveBorrows),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::BorrowLimitExceeded.code(), 4001);
        assert_eq!(ErrorCode::InsufficientCopies.code(), 6001);
        assert_eq!(ErrorCode::OverReturn.code(), 6002);
        assert_eq!(ErrorCode::PasswordMismatch.code(), 8002);
    }

    #[test]
    fn test_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::NotFound,
            ErrorCode::InvalidCredentials,
            ErrorCode::ManagerRequired,
            ErrorCode::BorrowLimitExceeded,
            ErrorCode::InvalidDateRange,
            ErrorCode::InsufficientCopies,
            ErrorCode::DuplicateIsbn,
            ErrorCode::DuplicateUsername,
            ErrorCode::DatabaseError,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InsufficientCopies).unwrap();
        assert_eq!(json, "6001");
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::InsufficientCopies);
    }
}

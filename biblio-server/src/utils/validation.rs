//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are applied
//! at the handler boundary.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: book title, author, category, member name, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, addresses, biographies
pub const MAX_TEXT_LEN: usize = 500;

/// Short identifiers: phone numbers, usernames
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Cover image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value {
        if v.len() > max_len {
            return Err(AppError::validation(format!(
                "{field} is too long ({} chars, max {max_len})",
                v.len()
            )));
        }
    }
    Ok(())
}

/// Validate an ISBN: 10 or 13 characters, digits only (ISBN-10 may end in X).
///
/// No checksum verification; the unique index guards against duplicates.
pub fn validate_isbn(isbn: &str) -> Result<(), AppError> {
    let len = isbn.len();
    if len != 10 && len != 13 {
        return Err(AppError::validation(format!(
            "ISBN must be 10 or 13 characters, got {len}"
        )));
    }
    let valid = isbn.chars().enumerate().all(|(i, c)| {
        c.is_ascii_digit() || (len == 10 && i == 9 && (c == 'X' || c == 'x'))
    });
    if !valid {
        return Err(AppError::validation(format!("ISBN contains invalid characters: {isbn}")));
    }
    Ok(())
}

/// Validate that a copy/limit count is within a sane positive range.
pub fn validate_count(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::validation(format!("{field} cannot be negative: {value}")));
    }
    if value > 100_000 {
        return Err(AppError::validation(format!("{field} is unreasonably large: {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("The Trial", "title", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "title", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "title", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_isbn_shapes() {
        assert!(validate_isbn("9780140449266").is_ok());
        assert!(validate_isbn("014044926X").is_ok());
        assert!(validate_isbn("978-0140449266").is_err());
        assert!(validate_isbn("12345").is_err());
        assert!(validate_isbn("978014044926X").is_err()); // X only valid for ISBN-10
    }

    #[test]
    fn test_count_bounds() {
        assert!(validate_count(0, "total_copies").is_ok());
        assert!(validate_count(-1, "total_copies").is_err());
        assert!(validate_count(1_000_000, "total_copies").is_err());
    }
}

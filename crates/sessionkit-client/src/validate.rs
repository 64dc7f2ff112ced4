//! Caller-side field validation.
//!
//! The clients do not re-check their inputs; presentation layers run these
//! before submitting a form.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your name!")]
    MissingName,
    #[error("Please enter your email!")]
    MissingEmail,
    #[error("Enter a valid email!")]
    InvalidEmail,
    #[error("Please enter a password!")]
    MissingPassword,
    #[error("Password must be at least 6 characters!")]
    PasswordTooShort,
}

/// Check a display name.
///
/// # Errors
/// Returns error if the name is blank.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::MissingName)
    } else {
        Ok(())
    }
}

/// Check an email address.
///
/// # Errors
/// Returns error if the email is blank or not shaped `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        Err(ValidationError::MissingEmail)
    } else if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Check a password.
///
/// # Errors
/// Returns error if the password is empty or shorter than [`MIN_PASSWORD_LEN`].
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    match password.chars().count() {
        0 => Err(ValidationError::MissingPassword),
        n if n < MIN_PASSWORD_LEN => Err(ValidationError::PasswordTooShort),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert_eq!(validate_email("a@x.com"), Ok(()));
        assert_eq!(validate_email("  "), Err(ValidationError::MissingEmail));
        assert_eq!(validate_email("a@x"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a b@x.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ax.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_password_length() {
        assert_eq!(validate_password(""), Err(ValidationError::MissingPassword));
        assert_eq!(validate_password("12345"), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_password("123456"), Ok(()));
        // counted in characters, not bytes
        assert_eq!(validate_password("ééééé"), Err(ValidationError::PasswordTooShort));
    }

    #[test]
    fn test_name() {
        assert_eq!(validate_name("Ann"), Ok(()));
        assert_eq!(validate_name(" \t"), Err(ValidationError::MissingName));
    }
}

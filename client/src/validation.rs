//! Form-layer input checks.
//!
//! These run before any request is built; a value that fails here never
//! reaches the network. The server performs its own validation, so the rules
//! here are deliberately minimal.

use thiserror::Error;

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reasons a form value is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Email is required")]
    EmptyEmail,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password is required")]
    EmptyPassword,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort {
        /// Length of the rejected password, in characters.
        length: usize,
    },
}

/// Checks that a task title is non-empty after trimming.
///
/// Returns the trimmed title.
///
/// # Examples
///
/// ```
/// use taskdeck_client::validation::validate_title;
///
/// assert_eq!(validate_title("  Buy Milk ").unwrap(), "Buy Milk");
/// assert!(validate_title("   ").is_err());
/// ```
pub fn validate_title(title: &str) -> Result<&str, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed)
}

/// Checks that a password has at least [`MIN_PASSWORD_LENGTH`] characters.
///
/// Whitespace counts; passwords are never trimmed.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort { length });
    }
    Ok(())
}

/// Checks that a password was entered at all. Used for login, where the
/// length rule of [`validate_password`] does not apply.
pub fn require_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Checks that an email is present and contains an `@`.
///
/// Returns the trimmed address.
pub fn validate_email(email: &str) -> Result<&str, ValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !trimmed.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(trimmed)
}

//! Validation Utilities
//!
//! Input validation for signup, login, and track submissions, plus the
//! custom validator hooks the request DTOs derive against.

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("invalid validation regex"))
}

/// Validates email address format
pub fn validate_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    cached(
        &EMAIL_REGEX,
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$",
    )
    .is_match(email)
}

/// Normalizes email address to lowercase and removes whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates username format: 3-30 letters, digits, and underscores
pub fn validate_username(username: &str) -> bool {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    cached(&USERNAME_REGEX, r"^[a-zA-Z0-9_]{3,30}$").is_match(username.trim())
}

/// Validates a display name: 1-255 characters of letters, spaces, hyphens,
/// and apostrophes
pub fn validate_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 255 {
        return false;
    }

    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    cached(&NAME_REGEX, r"^[a-zA-Z\s\-']+$").is_match(trimmed)
}

/// Validates URL format for cover images and audio files
///
/// The empty string passes so optional URL fields can stay blank.
pub fn validate_url(url: &str) -> bool {
    if url.is_empty() {
        return true;
    }

    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    cached(&URL_REGEX, r"^https?://[^\s/$.?#].[^\s]*$").is_match(url) && url.len() <= 512
}

/// Validates a six digit email verification code
pub fn validate_verification_code(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
}

/// Custom validator for email fields using the validator crate
pub fn email_validator(email: &str) -> Result<(), ValidationError> {
    if validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

/// Custom validator for username fields using the validator crate
pub fn username_validator(username: &str) -> Result<(), ValidationError> {
    if validate_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// Custom validator for name fields using the validator crate
pub fn name_validator(name: &str) -> Result<(), ValidationError> {
    if validate_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_name"))
    }
}

/// Custom validator for URL fields using the validator crate
pub fn url_validator(url: &str) -> Result<(), ValidationError> {
    if validate_url(url) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_url"))
    }
}

/// Custom validator for verification code fields using the validator crate
pub fn verification_code_validator(code: &str) -> Result<(), ValidationError> {
    if validate_verification_code(code) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_verification_code"))
    }
}

/// Validation error messages for user-friendly responses
pub mod messages {
    pub const INVALID_EMAIL: &str = "Please enter a valid email address";
    pub const INVALID_USERNAME: &str =
        "Username must be 3-30 characters of letters, digits, or underscores";
    pub const INVALID_NAME: &str =
        "Name can only use letters, spaces, hyphens, and apostrophes";
    pub const INVALID_URL: &str = "Links must start with http:// or https://";
    pub const INVALID_CODE: &str = "Verification code must be six digits";
    pub const FIELD_REQUIRED: &str = "This field is required";
    pub const PASSWORD_LENGTH: &str = "Password must be between 8 and 128 characters";
}

//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::User;
use crate::utils::validation::{email_validator, name_validator, url_validator, username_validator};

/// Request payload for starting a signup
///
/// Signup does not create the account; it only sends a verification code
/// to the email. The account itself is created by [`VerifyEmailRequest`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address to verify (must be unique and valid format)
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// Desired username (must be unique)
    #[validate(custom(function = "username_validator"))]
    pub username: String,
}

/// Request payload for verifying an email and creating the account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    /// Email address the code was sent to
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// Desired username (must be unique)
    #[validate(custom(function = "username_validator"))]
    pub username: String,

    /// User's display name (1-255 characters)
    #[validate(custom(function = "name_validator"))]
    pub full_name: String,

    /// User's chosen password
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub password: String,

    /// 6-digit verification code received via email
    #[validate(length(
        min = 6,
        max = 6,
        message = "Verification code must be exactly 6 digits"
    ))]
    #[validate(custom(function = "crate::utils::validation::verification_code_validator"))]
    pub code: String,
}

/// Request payload for logging in
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address of the account
    #[validate(length(min = 1, message = "Username or email cannot be empty"))]
    pub username_or_email: String,

    /// Account password
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Request payload for starting a password reset
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Username or email address of the account
    #[validate(length(min = 1, message = "Username or email cannot be empty"))]
    pub username_or_email: String,
}

/// Request payload for completing a password reset
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// Reset token from the emailed link
    #[validate(length(min = 1, message = "Reset token cannot be empty"))]
    pub token: String,

    /// New password
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub new_password: String,

    /// Confirmation of the new password
    #[validate(length(min = 1, message = "Password confirmation cannot be empty"))]
    pub confirm_password: String,
}

/// Request payload for uploading a track
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTrackRequest {
    /// Track title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Credited artist name
    #[validate(length(min = 1, max = 200, message = "Artist must be 1-200 characters"))]
    pub artist: String,

    /// Track length, e.g. "3:42"
    #[validate(length(min = 1, max = 20, message = "Duration cannot be empty"))]
    pub duration: String,

    /// URL of the audio file to ingest
    #[validate(length(min = 1, message = "Audio file URL cannot be empty"))]
    #[validate(custom(function = "url_validator"))]
    pub audio_file_url: String,

    /// Optional URL of the cover artwork to ingest
    #[validate(custom(function = "url_validator"))]
    pub cover_image_url: Option<String>,
}

/// Response for operations that only acknowledge
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Response for the current-user endpoint
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The logged-in user, or null for anonymous callers
    pub user: Option<User>,
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

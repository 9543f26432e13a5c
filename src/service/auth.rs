//! Auth Service Implementation
//!
//! Core business logic for the account lifecycle: signup with email
//! verification, login, session issuance, and password reset. Transport
//! concerns (cookies, status codes) stay out; handlers adapt.

use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::models::requests::{
    LoginRequest, ResetPasswordRequest, SignupRequest, VerifyEmailRequest,
};
use crate::models::session::{AuthPayload, Identity};
use crate::models::user::{NewUser, User, UserRecord};
use crate::service::notifier::Notifier;
use crate::service::reset::ResetTokenStore;
use crate::service::session::SessionService;
use crate::service::verification::VerificationCodeStore;
use crate::store::{ConflictField, StoreError, UserRepository};
use crate::utils::error::AppError;
use crate::utils::security::{hash_password_with_cost, verify_password, DEFAULT_BCRYPT_COST};
use crate::utils::validation::normalize_email;

/// Default base URL for links embedded in emails
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Custom error types for the auth service
#[derive(Error, Debug)]
pub enum AuthError {
    /// A unique account field is already taken
    #[error("The {0} is already in use")]
    Conflict(ConflictField),

    /// Signup verification was attempted for an email that already has an
    /// account
    #[error("Email is already verified")]
    AlreadyVerified,

    /// No live verification code exists for the email
    #[error("Verification code has expired")]
    CodeExpired,

    /// The submitted verification code does not match the stored one
    #[error("Invalid verification code")]
    CodeMismatch,

    /// New password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// No account matches the given identifier
    #[error("User not found")]
    UserNotFound,

    /// Password check failed for an existing account
    #[error("Incorrect password")]
    InvalidCredentials,

    /// Reset token is unknown or past its expiry
    #[error("Invalid or expired reset token")]
    ResetTokenInvalid,

    /// Session token failed validation
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// Session token could not be signed
    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    /// Password hashing operation failed
    #[error("Password hashing error: {0}")]
    HashingError(#[from] bcrypt::BcryptError),

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Conflict(field) => {
                AppError::Conflict(format!("The {} is already in use", field))
            }
            AuthError::AlreadyVerified => {
                AppError::Conflict("Email is already verified".to_string())
            }
            AuthError::CodeExpired => {
                AppError::BadRequest("Verification code has expired".to_string())
            }
            AuthError::CodeMismatch => {
                AppError::BadRequest("Invalid verification code".to_string())
            }
            AuthError::PasswordMismatch => {
                AppError::BadRequest("Passwords do not match".to_string())
            }
            AuthError::UserNotFound => AppError::NotFound("User not found".to_string()),
            AuthError::InvalidCredentials => {
                AppError::Authentication("Incorrect password".to_string())
            }
            AuthError::ResetTokenInvalid => {
                AppError::BadRequest("Invalid or expired reset token".to_string())
            }
            AuthError::InvalidToken(msg) => AppError::Authentication(msg),
            AuthError::TokenGeneration(msg) => {
                AppError::Internal(format!("Token generation error: {}", msg))
            }
            AuthError::HashingError(_) => {
                AppError::Internal("Password hashing error".to_string())
            }
            // A racing duplicate surfaces from storage; still a conflict to
            // the caller
            AuthError::StorageError(StoreError::Duplicate(field)) => {
                AppError::Conflict(format!("The {} is already in use", field))
            }
            AuthError::StorageError(_) => {
                AppError::Internal("A storage error occurred".to_string())
            }
        }
    }
}

/// Result type for auth service operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Core auth service coordinating accounts, codes, tokens, and email
pub struct AuthService {
    /// Account storage
    users: Arc<dyn UserRepository>,

    /// Verification codes for signup
    codes: VerificationCodeStore,

    /// Password reset tokens
    resets: ResetTokenStore,

    /// Session token signing and validation
    sessions: SessionService,

    /// Outbound email
    notifier: Arc<dyn Notifier>,

    /// Base URL for links embedded in emails
    base_url: String,

    /// bcrypt cost factor for password hashing
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create a new auth service from its collaborators
    pub fn new(
        users: Arc<dyn UserRepository>,
        codes: VerificationCodeStore,
        resets: ResetTokenStore,
        sessions: SessionService,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            users,
            codes,
            resets,
            sessions,
            notifier,
            base_url: DEFAULT_BASE_URL.to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Set the base URL used in emailed links
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the bcrypt cost factor
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Start a signup by sending a verification code to the email
    ///
    /// No account is created yet. Repeating the call while a code is
    /// outstanding reuses it and sends nothing, so refresh-happy clients
    /// cannot flood an inbox.
    pub async fn signup(&self, request: SignupRequest) -> AuthResult<()> {
        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();

        if let Some(existing) = self
            .users
            .find_by_email_or_username(&email, &username)
            .await?
        {
            let field = if existing.username == username {
                ConflictField::Username
            } else {
                ConflictField::Email
            };
            return Err(AuthError::Conflict(field));
        }

        let issued = self.codes.issue_if_absent(&email).await?;
        if issued.fresh {
            if let Err(err) = self
                .notifier
                .send_verification_code(&email, &issued.code, self.codes.validity())
                .await
            {
                warn!("failed to send verification code to {}: {}", email, err);
            }
        }

        Ok(())
    }

    /// Check the verification code and create the account
    ///
    /// On success the code entry is dropped, a welcome email goes out, and
    /// the caller gets a live session.
    pub async fn verify_email(&self, request: VerifyEmailRequest) -> AuthResult<AuthPayload> {
        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();

        if let Some(existing) = self
            .users
            .find_by_email_or_username(&email, &username)
            .await?
        {
            if existing.email == email {
                return Err(AuthError::AlreadyVerified);
            }
            return Err(AuthError::Conflict(ConflictField::Username));
        }

        self.codes.check(&email, &request.code).await?;

        let password_hash = hash_password_with_cost(&request.password, self.bcrypt_cost)?;
        let record = self
            .users
            .create(NewUser {
                username,
                full_name: request.full_name.trim().to_string(),
                email: email.clone(),
                password_hash,
            })
            .await
            .map_err(|err| match err {
                StoreError::Duplicate(field) => AuthError::Conflict(field),
                other => AuthError::StorageError(other),
            })?;

        self.codes.invalidate(&email).await?;

        let token = self.sessions.issue(&record)?;
        if let Err(err) = self.notifier.send_welcome(&record.email, &record.username).await {
            warn!("failed to send welcome email to {}: {}", record.email, err);
        }

        Ok(AuthPayload {
            user: record.into(),
            token,
        })
    }

    /// Log in with a username or email plus password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthPayload> {
        let record = self
            .lookup(&request.username_or_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&request.password, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.sessions.issue(&record)?;
        Ok(AuthPayload {
            user: record.into(),
            token,
        })
    }

    /// Start a password reset by emailing a tokenized link
    ///
    /// While a token is outstanding, repeated requests reuse it and send
    /// nothing new.
    pub async fn forgot_password(&self, username_or_email: &str) -> AuthResult<()> {
        let record = self
            .lookup(username_or_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let issued = self.resets.issue_if_absent_or_expired(&record).await?;
        if issued.fresh {
            let reset_url = format!(
                "{}/reset-password/{}",
                self.base_url.trim_end_matches('/'),
                issued.token
            );
            if let Err(err) = self.notifier.send_reset_link(&record.email, &reset_url).await {
                warn!("failed to send reset link to {}: {}", record.email, err);
            }
        }

        Ok(())
    }

    /// Complete a password reset with the emailed token
    ///
    /// The token fields are cleared and the new hash stored in one
    /// repository update, so the token cannot be replayed against a
    /// half-changed account.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AuthResult<()> {
        if request.new_password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let mut record = self.resets.consume(&request.token).await?;
        record.password_hash = hash_password_with_cost(&request.new_password, self.bcrypt_cost)?;
        record.reset_token = None;
        record.reset_token_expires_at = None;
        self.users.update(&record).await?;

        if let Err(err) = self.notifier.send_reset_confirmation(&record.email).await {
            warn!(
                "failed to send reset confirmation to {}: {}",
                record.email, err
            );
        }

        Ok(())
    }

    /// Resolve the caller's profile from an already-validated identity
    ///
    /// Anonymous callers and lookup failures both read as "no user"; this
    /// never turns into a request error.
    pub async fn current_user(&self, identity: Option<&Identity>) -> Option<User> {
        let identity = identity?;
        match self.users.find_by_id(identity.user_id).await {
            Ok(found) => found.map(User::from),
            Err(err) => {
                debug!("current user lookup failed for {}: {}", identity.user_id, err);
                None
            }
        }
    }

    /// Find an account by a string that may be a username or an email
    async fn lookup(&self, username_or_email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.users
            .find_by_email_or_username(
                &normalize_email(username_or_email),
                username_or_email.trim(),
            )
            .await
    }
}

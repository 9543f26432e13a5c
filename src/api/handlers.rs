//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers for the authentication and
//! track endpoints. Handlers validate incoming payloads, delegate to the
//! service layer, and wrap results in the standard response envelope.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    models::{
        CreateTrackRequest, ForgotPasswordRequest, HealthCheckResponse, LoginRequest, MeResponse,
        MessageResponse, ResetPasswordRequest, SignupRequest, SuccessResponse, TrackView,
        VerifyEmailRequest,
    },
    service::{AuthService, TrackService},
    utils::error::{AppError, AppResult},
    VERSION,
};

use super::middleware::{session_cookie, CurrentUser};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tracks: Arc<TrackService>,
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse<HealthCheckResponse>> {
    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
    };

    Json(SuccessResponse::new(response))
}

/// Start signup by emailing a verification code
///
/// No account exists after this call; the caller must come back with the
/// code to finish registration.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<Json<SuccessResponse<MessageResponse>>> {
    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid signup data: {}", e)))?;

    state.auth.signup(request).await?;

    let response = MessageResponse::new("Verification code sent");
    Ok(Json(SuccessResponse::new(response)))
}

/// Finish signup by checking the emailed code and creating the account
///
/// On success the session token is returned in the body and also set as a
/// cookie, so browser clients are logged in immediately.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> AppResult<impl IntoResponse> {
    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid verification data: {}", e)))?;

    let payload = state.auth.verify_email(request).await?;

    let cookie = session_cookie(&payload.token);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SuccessResponse::new(payload)),
    ))
}

/// Log in with username or email plus password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid login data: {}", e)))?;

    let payload = state.auth.login(request).await?;

    let cookie = session_cookie(&payload.token);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SuccessResponse::new(payload)),
    ))
}

/// Request a password reset link for an existing account
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<Json<SuccessResponse<MessageResponse>>> {
    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid reset request: {}", e)))?;

    state
        .auth
        .forgot_password(&request.username_or_email)
        .await?;

    let response = MessageResponse::new("Password reset email sent");
    Ok(Json(SuccessResponse::new(response)))
}

/// Set a new password using a reset token from the emailed link
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<SuccessResponse<MessageResponse>>> {
    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid password data: {}", e)))?;

    state.auth.reset_password(request).await?;

    let response = MessageResponse::new("Password has been reset");
    Ok(Json(SuccessResponse::new(response)))
}

/// Return the logged-in user, or null for anonymous callers
///
/// This endpoint never fails; the frontend polls it on load to decide
/// whether to show the login screen.
pub async fn me(
    State(state): State<AppState>,
    identity: Option<Extension<CurrentUser>>,
) -> Json<SuccessResponse<MeResponse>> {
    let identity = identity
        .as_ref()
        .map(|Extension(CurrentUser(identity))| identity);
    let user = state.auth.current_user(identity).await;

    Json(SuccessResponse::new(MeResponse { user }))
}

/// List the track feed, newest first
pub async fn track_feed(
    State(state): State<AppState>,
) -> AppResult<Json<SuccessResponse<Vec<TrackView>>>> {
    let tracks = state.tracks.feed().await?;

    Ok(Json(SuccessResponse::new(tracks)))
}

/// Upload a new track for the logged-in user
pub async fn create_track(
    State(state): State<AppState>,
    identity: Option<Extension<CurrentUser>>,
    Json(request): Json<CreateTrackRequest>,
) -> AppResult<Json<SuccessResponse<TrackView>>> {
    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid track data: {}", e)))?;

    let identity = identity
        .as_ref()
        .map(|Extension(CurrentUser(identity))| identity);
    let track = state.tracks.create(identity, request).await?;

    Ok(Json(SuccessResponse::new(track)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::PassthroughUploader;
    use crate::service::{LogNotifier, ResetTokenStore, SessionService, VerificationCodeStore};
    use crate::store::{MemoryExpiringStore, MemoryTrackRepository, MemoryUserRepository};

    fn test_state() -> AppState {
        let users = Arc::new(MemoryUserRepository::new());
        let auth = AuthService::new(
            users.clone(),
            VerificationCodeStore::new(Arc::new(MemoryExpiringStore::new())),
            ResetTokenStore::new(users.clone()),
            SessionService::new("handler_test_secret"),
            Arc::new(LogNotifier::new()),
        )
        .with_bcrypt_cost(4);

        AppState {
            auth: Arc::new(auth),
            tracks: Arc::new(TrackService::new(
                Arc::new(MemoryTrackRepository::new()),
                Arc::new(PassthroughUploader::new()),
            )),
        }
    }

    #[tokio::test]
    async fn test_health_check_reports_version() {
        let response = health_check().await;
        assert!(response.0.success);
        assert_eq!(response.0.data.status, "healthy");
        assert_eq!(response.0.data.version, VERSION);
    }

    #[tokio::test]
    async fn test_signup_rejects_invalid_email() {
        let state = test_state();
        let request = SignupRequest {
            email: "not-an-email".to_string(),
            username: "songbird".to_string(),
        };

        let result = signup(State(state), Json(request)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_me_without_identity_returns_null_user() {
        let state = test_state();

        let response = me(State(state), None).await;
        assert!(response.0.data.user.is_none());
    }

    #[tokio::test]
    async fn test_create_track_requires_login() {
        let state = test_state();
        let request = CreateTrackRequest {
            title: "Night Drive".to_string(),
            artist: "Vera Lux".to_string(),
            duration: "3:41".to_string(),
            audio_file_url: "https://cdn.example.com/night-drive.mp3".to_string(),
            cover_image_url: None,
        };

        let result = create_track(State(state), None, Json(request)).await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }
}

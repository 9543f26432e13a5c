//! End-to-end account and track flows over the HTTP surface.
//!
//! Everything runs against in-memory backends with a recording notifier, so
//! emailed codes and reset links can be read back and fed into the next
//! request the way a real client would.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use resonate::{
    api::{create_routes, AppState},
    media::PassthroughUploader,
    service::{
        AuthService, Notifier, NotifierError, ResetTokenStore, SessionService, TrackService,
        VerificationCodeStore,
    },
    store::{MemoryExpiringStore, MemoryTrackRepository, MemoryUserRepository},
};

/// Captures outbound email instead of sending it
#[derive(Default)]
struct RecordingNotifier {
    codes: Mutex<Vec<(String, String)>>,
    reset_links: Mutex<Vec<(String, String)>>,
    welcomes: Mutex<Vec<String>>,
    confirmations: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn last_code(&self) -> Option<String> {
        self.codes
            .lock()
            .unwrap()
            .last()
            .map(|(_, code)| code.clone())
    }

    fn last_reset_link(&self) -> Option<String> {
        self.reset_links
            .lock()
            .unwrap()
            .last()
            .map(|(_, url)| url.clone())
    }

    fn code_count(&self) -> usize {
        self.codes.lock().unwrap().len()
    }

    fn reset_link_count(&self) -> usize {
        self.reset_links.lock().unwrap().len()
    }

    fn welcome_count(&self) -> usize {
        self.welcomes.lock().unwrap().len()
    }

    fn confirmation_count(&self) -> usize {
        self.confirmations.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_verification_code(
        &self,
        to_email: &str,
        code: &str,
        _validity: Duration,
    ) -> Result<(), NotifierError> {
        self.codes
            .lock()
            .unwrap()
            .push((to_email.to_string(), code.to_string()));
        Ok(())
    }

    async fn send_welcome(&self, to_email: &str, _username: &str) -> Result<(), NotifierError> {
        self.welcomes.lock().unwrap().push(to_email.to_string());
        Ok(())
    }

    async fn send_reset_link(&self, to_email: &str, reset_url: &str) -> Result<(), NotifierError> {
        self.reset_links
            .lock()
            .unwrap()
            .push((to_email.to_string(), reset_url.to_string()));
        Ok(())
    }

    async fn send_reset_confirmation(&self, to_email: &str) -> Result<(), NotifierError> {
        self.confirmations.lock().unwrap().push(to_email.to_string());
        Ok(())
    }
}

struct TestApp {
    app: Router,
    notifier: Arc<RecordingNotifier>,
}

fn test_app() -> TestApp {
    let users = Arc::new(MemoryUserRepository::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let sessions = Arc::new(SessionService::new("integration_secret"));

    let auth = AuthService::new(
        users.clone(),
        VerificationCodeStore::new(Arc::new(MemoryExpiringStore::new())),
        ResetTokenStore::new(users),
        (*sessions).clone(),
        notifier.clone(),
    )
    .with_base_url("https://resonate.example.com")
    .with_bcrypt_cost(4);

    let state = AppState {
        auth: Arc::new(auth),
        tracks: Arc::new(TrackService::new(
            Arc::new(MemoryTrackRepository::new()),
            Arc::new(PassthroughUploader::new()),
        )),
    };

    TestApp {
        app: create_routes(sessions).with_state(state),
        notifier,
    }
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body, set_cookie)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value, Option<String>) {
    request(app, Method::POST, uri, Some(body), None).await
}

async fn post_with_cookie(
    app: &Router,
    uri: &str,
    body: Value,
    cookie: &str,
) -> (StatusCode, Value, Option<String>) {
    request(app, Method::POST, uri, Some(body), Some(cookie)).await
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
    let (status, body, _) = request(app, Method::GET, uri, None, cookie).await;
    (status, body)
}

/// Reduce a Set-Cookie header to the `name=value` pair a client would echo back
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Run the full signup flow and return the session cookie pair
async fn register(app: &TestApp, email: &str, username: &str, password: &str) -> String {
    let (status, _, _) = post(
        &app.app,
        "/auth/signup",
        json!({ "email": email, "username": username }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let code = app.notifier.last_code().expect("verification code recorded");
    let (status, _, set_cookie) = post(
        &app.app,
        "/auth/verify-email",
        json!({
            "email": email,
            "username": username,
            "full_name": "Test Listener",
            "password": password,
            "code": code,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    cookie_pair(&set_cookie.expect("session cookie set"))
}

#[tokio::test]
async fn test_signup_verify_login_flow() {
    let app = test_app();

    let (status, body, _) = post(
        &app.app,
        "/auth/signup",
        json!({ "email": "listener@example.com", "username": "songbird" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["message"], "Verification code sent");

    let code = app.notifier.last_code().expect("verification code recorded");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    let number: u32 = code.parse().unwrap();
    assert!((100_000..=999_999).contains(&number));

    let (status, body, set_cookie) = post(
        &app.app,
        "/auth/verify-email",
        json!({
            "email": "listener@example.com",
            "username": "songbird",
            "full_name": "Song Bird",
            "password": "mixtape-van-92",
            "code": code,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "songbird");
    assert_eq!(body["data"]["user"]["email"], "listener@example.com");
    assert!(!body["data"]["user"]
        .as_object()
        .unwrap()
        .contains_key("password_hash"));
    assert!(body["data"]["token"].as_str().unwrap().len() > 20);

    let set_cookie = set_cookie.expect("session cookie set");
    assert!(set_cookie.starts_with("__resonate_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert_eq!(app.notifier.welcome_count(), 1);

    // The cookie is a live session
    let cookie = cookie_pair(&set_cookie);
    let (status, body) = get(&app.app, "/auth/me", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "songbird");

    // Without the cookie the same endpoint reads as anonymous
    let (status, body) = get(&app.app, "/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["user"].is_null());
}

#[tokio::test]
async fn test_repeated_signup_reuses_outstanding_code() {
    let app = test_app();

    for _ in 0..3 {
        let (status, _, _) = post(
            &app.app,
            "/auth/signup",
            json!({ "email": "listener@example.com", "username": "songbird" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // The outstanding code is reused; only the first call sends mail
    assert_eq!(app.notifier.code_count(), 1);
}

#[tokio::test]
async fn test_wrong_code_rejected_then_correct_code_accepted() {
    let app = test_app();

    post(
        &app.app,
        "/auth/signup",
        json!({ "email": "listener@example.com", "username": "songbird" }),
    )
    .await;

    // Codes never start with 0, so this is always a mismatch
    let (status, body, _) = post(
        &app.app,
        "/auth/verify-email",
        json!({
            "email": "listener@example.com",
            "username": "songbird",
            "full_name": "Song Bird",
            "password": "mixtape-van-92",
            "code": "000000",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert_eq!(body["message"], "Invalid verification code");

    // A failed attempt does not burn the code
    let code = app.notifier.last_code().unwrap();
    let (status, _, _) = post(
        &app.app,
        "/auth/verify-email",
        json!({
            "email": "listener@example.com",
            "username": "songbird",
            "full_name": "Song Bird",
            "password": "mixtape-van-92",
            "code": code,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_verify_without_signup_reads_as_expired() {
    let app = test_app();

    let (status, body, _) = post(
        &app.app,
        "/auth/verify-email",
        json!({
            "email": "listener@example.com",
            "username": "songbird",
            "full_name": "Song Bird",
            "password": "mixtape-van-92",
            "code": "123456",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Verification code has expired");
}

#[tokio::test]
async fn test_duplicate_account_conflicts() {
    let app = test_app();
    register(&app, "listener@example.com", "songbird", "mixtape-van-92").await;

    // Username taken
    let (status, body, _) = post(
        &app.app,
        "/auth/signup",
        json!({ "email": "other@example.com", "username": "songbird" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("username"));

    // Email taken
    let (status, body, _) = post(
        &app.app,
        "/auth/signup",
        json!({ "email": "listener@example.com", "username": "newbird" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("email"));

    // Both taken reads as a username conflict
    let (status, body, _) = post(
        &app.app,
        "/auth/signup",
        json!({ "email": "listener@example.com", "username": "songbird" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("username"));

    // Re-running verification for the registered email is a distinct conflict
    let (status, body, _) = post(
        &app.app,
        "/auth/verify-email",
        json!({
            "email": "listener@example.com",
            "username": "freshname",
            "full_name": "Song Bird",
            "password": "mixtape-van-92",
            "code": "123456",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email is already verified");
}

#[tokio::test]
async fn test_login_with_username_email_and_failures() {
    let app = test_app();
    register(&app, "listener@example.com", "songbird", "mixtape-van-92").await;

    let (status, _, set_cookie) = post(
        &app.app,
        "/auth/login",
        json!({ "username_or_email": "songbird", "password": "mixtape-van-92" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.unwrap().starts_with("__resonate_token="));

    let (status, _, _) = post(
        &app.app,
        "/auth/login",
        json!({ "username_or_email": "listener@example.com", "password": "mixtape-van-92" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Bad password on a real account
    let (status, body, _) = post(
        &app.app,
        "/auth/login",
        json!({ "username_or_email": "songbird", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTHENTICATION_ERROR");
    assert_eq!(body["message"], "Incorrect password");

    // Unknown account is distinguishable from a bad password
    let (status, body, _) = post(
        &app.app,
        "/auth/login",
        json!({ "username_or_email": "nobody", "password": "mixtape-van-92" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_track_upload_and_feed() {
    let app = test_app();
    let cookie = register(&app, "listener@example.com", "songbird", "mixtape-van-92").await;

    let (status, body, _) = post_with_cookie(
        &app.app,
        "/tracks",
        json!({
            "title": "Night Drive",
            "artist": "Vera Lux",
            "duration": "3:41",
            "audio_file_url": "https://cdn.example.com/night-drive.mp3",
        }),
        &cookie,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Night Drive");
    assert_eq!(body["data"]["author_name"], "songbird");
    assert_eq!(body["data"]["has_liked"], false);
    assert_eq!(
        body["data"]["audio_file_url"],
        "https://cdn.example.com/night-drive.mp3"
    );

    let (status, _, _) = post_with_cookie(
        &app.app,
        "/tracks",
        json!({
            "title": "Morning Static",
            "artist": "Vera Lux",
            "duration": "2:58",
            "audio_file_url": "https://cdn.example.com/morning-static.mp3",
            "cover_image_url": "https://cdn.example.com/morning-static.jpg",
        }),
        &cookie,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Feed is public and newest first
    let (status, body) = get(&app.app, "/tracks/feed", None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["title"], "Morning Static");
    assert_eq!(feed[1]["title"], "Night Drive");

    // Uploads require a session
    let (status, body, _) = post(
        &app.app,
        "/tracks",
        json!({
            "title": "Unsigned",
            "artist": "Vera Lux",
            "duration": "1:00",
            "audio_file_url": "https://cdn.example.com/unsigned.mp3",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please login or signup first");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = test_app();
    register(&app, "listener@example.com", "songbird", "original-pass-1").await;

    let (status, _, _) = post(
        &app.app,
        "/auth/forgot-password",
        json!({ "username_or_email": "songbird" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let link = app.notifier.last_reset_link().expect("reset link recorded");
    let prefix = "https://resonate.example.com/reset-password/";
    assert!(link.starts_with(prefix));
    let token = link.strip_prefix(prefix).unwrap().to_string();
    assert_eq!(token.len(), 40);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    // A second request while the token is live resends nothing
    let (status, _, _) = post(
        &app.app,
        "/auth/forgot-password",
        json!({ "username_or_email": "listener@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.notifier.reset_link_count(), 1);

    // Mismatched confirmation leaves the token intact
    let (status, body, _) = post(
        &app.app,
        "/auth/reset-password",
        json!({
            "token": token,
            "new_password": "fresh-pass-22",
            "confirm_password": "different-pass",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Passwords do not match");

    let (status, _, _) = post(
        &app.app,
        "/auth/reset-password",
        json!({
            "token": token,
            "new_password": "fresh-pass-22",
            "confirm_password": "fresh-pass-22",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.notifier.confirmation_count(), 1);

    // Old password is dead, new one works
    let (status, _, _) = post(
        &app.app,
        "/auth/login",
        json!({ "username_or_email": "songbird", "password": "original-pass-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = post(
        &app.app,
        "/auth/login",
        json!({ "username_or_email": "songbird", "password": "fresh-pass-22" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The token was single-use
    let (status, body, _) = post(
        &app.app,
        "/auth/reset-password",
        json!({
            "token": token,
            "new_password": "another-pass-33",
            "confirm_password": "another-pass-33",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired reset token");
}

#[tokio::test]
async fn test_forgot_password_for_unknown_user() {
    let app = test_app();

    let (status, body, _) = post(
        &app.app,
        "/auth/forgot-password",
        json!({ "username_or_email": "nobody" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    assert_eq!(app.notifier.reset_link_count(), 0);
}

#[tokio::test]
async fn test_invalid_payloads_are_validation_errors() {
    let app = test_app();

    let (status, body, _) = post(
        &app.app,
        "/auth/signup",
        json!({ "email": "not-an-email", "username": "songbird" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    post(
        &app.app,
        "/auth/signup",
        json!({ "email": "listener@example.com", "username": "songbird" }),
    )
    .await;
    let code = app.notifier.last_code().unwrap();

    // Short password fails before the code is even checked
    let (status, body, _) = post(
        &app.app,
        "/auth/verify-email",
        json!({
            "email": "listener@example.com",
            "username": "songbird",
            "full_name": "Song Bird",
            "password": "short",
            "code": code,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body, _) = post(
        &app.app,
        "/auth/login",
        json!({ "username_or_email": "songbird", "password": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

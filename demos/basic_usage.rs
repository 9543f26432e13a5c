//! Basic Usage Example
//!
//! This example demonstrates how to use the backend as a library in your
//! own applications, running the whole account lifecycle over in-memory
//! storage: signup, email verification, login, and a first track upload.
//!
//! Run with: cargo run --example basic_usage

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use resonate::service::notifier::NotifierError;
use resonate::service::{ResetTokenStore, VerificationCodeStore};
use resonate::store::{MemoryExpiringStore, MemoryTrackRepository, MemoryUserRepository};
use resonate::{
    AuthService, CreateTrackRequest, LoginRequest, Notifier, SessionService, SignupRequest,
    TrackService, VerifyEmailRequest,
};

/// Notifier that prints emails to stdout and keeps the last verification
/// code so the example can complete the signup it started.
#[derive(Default)]
struct ConsoleNotifier {
    last_code: Mutex<Option<String>>,
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_verification_code(
        &self,
        to_email: &str,
        code: &str,
        validity: Duration,
    ) -> Result<(), NotifierError> {
        println!(
            "  [email to {}] your code is {} (valid {} minutes)",
            to_email,
            code,
            validity.as_secs() / 60
        );
        *self.last_code.lock().unwrap() = Some(code.to_string());
        Ok(())
    }

    async fn send_welcome(&self, to_email: &str, username: &str) -> Result<(), NotifierError> {
        println!("  [email to {}] welcome aboard, {}!", to_email, username);
        Ok(())
    }

    async fn send_reset_link(&self, to_email: &str, reset_url: &str) -> Result<(), NotifierError> {
        println!("  [email to {}] reset your password: {}", to_email, reset_url);
        Ok(())
    }

    async fn send_reset_confirmation(&self, to_email: &str) -> Result<(), NotifierError> {
        println!("  [email to {}] your password was changed", to_email);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Wire the services over in-memory storage
    let users = Arc::new(MemoryUserRepository::new());
    let codes = Arc::new(MemoryExpiringStore::new());
    let notifier = Arc::new(ConsoleNotifier::default());
    let sessions = SessionService::new("example_session_secret");

    let auth = AuthService::new(
        users.clone(),
        VerificationCodeStore::new(codes),
        ResetTokenStore::new(users),
        sessions.clone(),
        notifier.clone(),
    );
    let tracks = TrackService::new(
        Arc::new(MemoryTrackRepository::new()),
        Arc::new(resonate::media::PassthroughUploader::new()),
    );

    // Start a signup; the account does not exist yet
    println!("Signing up alice@example.com...");
    auth.signup(SignupRequest {
        email: "alice@example.com".to_string(),
        username: "alice_waves".to_string(),
    })
    .await?;

    let code = notifier
        .last_code
        .lock()
        .unwrap()
        .clone()
        .expect("signup should have emailed a code");

    // Verify the code; this creates the account and logs Alice in
    println!("Verifying with code {}...", code);
    let session = auth
        .verify_email(VerifyEmailRequest {
            email: "alice@example.com".to_string(),
            username: "alice_waves".to_string(),
            full_name: "Alice Rivers".to_string(),
            password: "correct-horse-battery".to_string(),
            code,
        })
        .await?;
    println!(
        "Created user: {} (ID: {})",
        session.user.username, session.user.id
    );

    // Log in again, this time by email
    println!("Logging in by email...");
    let session = auth
        .login(LoginRequest {
            username_or_email: "alice@example.com".to_string(),
            password: "correct-horse-battery".to_string(),
        })
        .await?;
    println!("Session token issued ({} chars)", session.token.len());

    // Validate the token the way the HTTP layer would, then upload a
    // track as Alice and read the feed back
    println!("Uploading a track...");
    let identity = sessions.identity(&session.token)?;
    let track = tracks
        .create(
            Some(&identity),
            CreateTrackRequest {
                title: "Harbor Lights".to_string(),
                artist: "Alice Rivers".to_string(),
                duration: "4:05".to_string(),
                audio_file_url: "https://cdn.example.com/raw/harbor-lights.mp3".to_string(),
                cover_image_url: None,
            },
        )
        .await?;
    println!("Uploaded track: {} (ID: {})", track.title, track.id);

    let feed = tracks.feed().await?;
    println!("Feed now has {} track(s)", feed.len());

    println!("Example completed successfully!");

    Ok(())
}

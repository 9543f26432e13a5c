//! Resonate Backend Library
//!
//! The account and track catalog service behind the Resonate music player.
//! Provides email-verified signup, password login with recovery, cookie
//! sessions, and track upload endpoints, designed so every backend (database,
//! cache, mail, media storage) can be swapped for an in-memory stand-in.
//!
//! # Features
//!
//! - **Email-Verified Signup**: Accounts exist only after the emailed code checks out
//! - **Password Security**: bcrypt hashing with a tunable work factor
//! - **Cookie Sessions**: Signed 24-hour tokens, set as HttpOnly cookies
//! - **Password Recovery**: Single-use, expiring reset links over email
//! - **Track Catalog**: Upload and feed endpoints for hosted audio
//! - **Composable Router**: Pick endpoints per deployment through RouterBuilder
//! - **Pluggable Storage**: PostgreSQL and Redis in production, in-memory in tests
//!
//! # Quick Start
//!
//! ## As a Service Library
//!
//! ```rust,no_run
//! use resonate::{
//!     models::SignupRequest,
//!     service::{AuthService, LogNotifier, ResetTokenStore, SessionService, VerificationCodeStore},
//!     store::{MemoryExpiringStore, MemoryUserRepository},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let users = Arc::new(MemoryUserRepository::new());
//!     let auth = AuthService::new(
//!         users.clone(),
//!         VerificationCodeStore::new(Arc::new(MemoryExpiringStore::new())),
//!         ResetTokenStore::new(users),
//!         SessionService::new("change-me"),
//!         Arc::new(LogNotifier::new()),
//!     );
//!
//!     auth.signup(SignupRequest {
//!         email: "listener@example.com".to_string(),
//!         username: "listener".to_string(),
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## As a Web Server Library
//!
//! ```rust,no_run
//! use resonate::{
//!     api::{create_routes, AppState},
//!     media::PassthroughUploader,
//!     service::{
//!         AuthService, LogNotifier, ResetTokenStore, SessionService, TrackService,
//!         VerificationCodeStore,
//!     },
//!     store::{MemoryExpiringStore, MemoryTrackRepository, MemoryUserRepository},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let users = Arc::new(MemoryUserRepository::new());
//!     let sessions = Arc::new(SessionService::new("change-me"));
//!
//!     let state = AppState {
//!         auth: Arc::new(AuthService::new(
//!             users.clone(),
//!             VerificationCodeStore::new(Arc::new(MemoryExpiringStore::new())),
//!             ResetTokenStore::new(users),
//!             (*sessions).clone(),
//!             Arc::new(LogNotifier::new()),
//!         )),
//!         tracks: Arc::new(TrackService::new(
//!             Arc::new(MemoryTrackRepository::new()),
//!             Arc::new(PassthroughUploader::new()),
//!         )),
//!     };
//!
//!     let app = create_routes(sessions).with_state(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Router Builder Examples
//!
//! Routers for different deployments:
//!
//! ```rust,no_run
//! use resonate::api::RouterBuilder;
//!
//! // Everything, the usual single-server setup
//! let full_router = RouterBuilder::with_all_routes().build();
//!
//! // Account endpoints only, for a separate catalog deployment
//! let auth_router = RouterBuilder::with_auth_routes().build();
//!
//! // Health check only, for monitoring
//! let monitor_router = RouterBuilder::with_minimal_routes().build();
//! ```
//!
//! # Architecture
//!
//! The crate splits into layers, outermost first:
//!
//! - **API Layer**: HTTP handlers, identity middleware, and configurable routes
//! - **Service Layer**: Signup, session, reset, notification, and track logic
//! - **Store Layer**: Repository traits with Postgres, Redis, and in-memory backends
//! - **Models**: Data structures and request/response definitions
//! - **Media**: Upload seam for hosted audio and cover art
//! - **Utils**: Shared helpers for security, validation, and error handling
//!
//! # Security
//!
//! - bcrypt password hashes, never stored or returned in plain form
//! - Uniformly random six-digit verification codes with a one-hour lifetime
//! - Single-use password reset tokens that expire after an hour
//! - HttpOnly session cookies; tokens never readable from page scripts
//! - Input validation on every request payload

/// HTTP handlers, identity middleware, and the route builder
pub mod api;

/// Environment-driven configuration for every subsystem
pub mod config;

/// Media upload seam for audio files and cover art
pub mod media;

/// Data models and request/response payloads
pub mod models;

/// Business logic for accounts, sessions, and tracks
pub mod service;

/// Storage traits and the Postgres, Redis, and in-memory backends
pub mod store;

/// Security, validation, and error helpers
pub mod utils;

// Re-export the types most callers need
pub use api::{create_routes, AppState, RouterBuilder};
pub use models::{
    requests::{
        CreateTrackRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
        SignupRequest, VerifyEmailRequest,
    },
    session::{AuthPayload, Identity, SessionClaims},
    track::TrackView,
    user::User,
};
pub use service::{AuthService, LogNotifier, Notifier, SessionService, SmtpNotifier, TrackService};
pub use store::{DatabaseConfig, ExpiringStore, TrackRepository, UserRepository};
pub use utils::error::{AppError, AppResult, ErrorResponse};

pub use config::{env, AppConfig, AuthConfig, ServerConfig};

/// Crate version, stamped into the health endpoint
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

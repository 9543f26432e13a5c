//! Service Layer
//!
//! Business logic for accounts, sessions, verification codes, password
//! resets, notifications, and the track catalog.

pub mod auth;
pub mod notifier;
pub mod reset;
pub mod session;
pub mod track;
pub mod verification;

// Re-export services
pub use auth::{AuthError, AuthResult, AuthService};
pub use notifier::{LogNotifier, Notifier, NotifierError, SmtpConfig, SmtpNotifier};
pub use reset::{IssuedReset, ResetTokenStore, RESET_TOKEN_TTL_SECONDS};
pub use session::{SessionService, SESSION_TTL_HOURS};
pub use track::{TrackError, TrackResult, TrackService};
pub use verification::{IssuedCode, VerificationCodeStore, CODE_TTL};

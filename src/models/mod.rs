//! Data Models Module
//!
//! User and track entities, session claims, and the validated
//! request/response payloads.

pub mod requests;
pub mod session;
pub mod track;
pub mod user;

// Re-export commonly used types
pub use requests::*;
pub use session::*;
pub use track::*;
pub use user::*;

//! API Layer
//!
//! HTTP endpoints, identity middleware, and the cookie plumbing for the
//! account and track service.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::AppState;
pub use middleware::{extract_token, identity_middleware, session_cookie, CurrentUser, SESSION_COOKIE};
pub use routes::{create_routes, RouterBuilder};

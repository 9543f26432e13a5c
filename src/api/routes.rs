//! API Route Definitions
//!
//! This module defines all HTTP routes and their corresponding handlers using a
//! builder pattern. The RouterBuilder allows selective enabling/disabling of API
//! endpoints for different deployment scenarios, such as running the track
//! catalog separately from the account service.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::service::SessionService;

use super::handlers::*;
use super::middleware::identity_middleware;

/// Builder for creating API routes with configurable endpoints
///
/// The RouterBuilder provides a fluent interface for constructing routers with
/// only the endpoints you need. This is useful for:
/// - Splitting account and catalog endpoints across deployments
/// - Feature flagging and gradual rollouts
/// - Security hardening by disabling unused endpoints
#[derive(Default)]
pub struct RouterBuilder {
    /// Whether to enable the health check endpoint (GET /health)
    health_check: bool,
    /// Whether to enable the signup endpoint (POST /auth/signup)
    signup: bool,
    /// Whether to enable the email verification endpoint (POST /auth/verify-email)
    verify_email: bool,
    /// Whether to enable the login endpoint (POST /auth/login)
    login: bool,
    /// Whether to enable the reset request endpoint (POST /auth/forgot-password)
    forgot_password: bool,
    /// Whether to enable the reset completion endpoint (POST /auth/reset-password)
    reset_password: bool,
    /// Whether to enable the current-user endpoint (GET /auth/me)
    me: bool,
    /// Whether to enable the track feed endpoint (GET /tracks/feed)
    track_feed: bool,
    /// Whether to enable the track upload endpoint (POST /tracks)
    create_track: bool,
    /// Session service for the identity middleware, when attached
    identity: Option<Arc<SessionService>>,
}

impl RouterBuilder {
    /// Creates a new router builder with all routes disabled by default
    ///
    /// Use this when you want to explicitly enable only specific routes.
    /// For common configurations, consider using the preset methods like
    /// `with_all_routes()` or `with_auth_routes()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with all routes enabled
    ///
    /// This is the full service: account lifecycle, sessions, and the
    /// track catalog.
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            signup: true,
            verify_email: true,
            login: true,
            forgot_password: true,
            reset_password: true,
            me: true,
            track_feed: true,
            create_track: true,
            identity: None,
        }
    }

    /// Creates a router builder with only the account routes
    ///
    /// Includes signup, verification, login, password reset, and the
    /// current-user endpoint. Excludes the track catalog, for deployments
    /// where tracks are served elsewhere.
    pub fn with_auth_routes() -> Self {
        Self {
            health_check: true,
            signup: true,
            verify_email: true,
            login: true,
            forgot_password: true,
            reset_password: true,
            me: true,
            track_feed: false,
            create_track: false,
            identity: None,
        }
    }

    /// Creates a router with minimal routes for monitoring
    ///
    /// Only includes the health check endpoint. Useful as a base
    /// configuration when you want to add specific routes one by one.
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            ..Self::default()
        }
    }

    /// Enables or disables the health check endpoint (GET /health)
    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    /// Enables or disables the signup endpoint (POST /auth/signup)
    ///
    /// Disable this to freeze registrations while keeping existing
    /// accounts working.
    pub fn signup(mut self, enabled: bool) -> Self {
        self.signup = enabled;
        self
    }

    /// Enables or disables the email verification endpoint (POST /auth/verify-email)
    pub fn verify_email(mut self, enabled: bool) -> Self {
        self.verify_email = enabled;
        self
    }

    /// Enables or disables the login endpoint (POST /auth/login)
    pub fn login(mut self, enabled: bool) -> Self {
        self.login = enabled;
        self
    }

    /// Enables or disables the reset request endpoint (POST /auth/forgot-password)
    pub fn forgot_password(mut self, enabled: bool) -> Self {
        self.forgot_password = enabled;
        self
    }

    /// Enables or disables the reset completion endpoint (POST /auth/reset-password)
    pub fn reset_password(mut self, enabled: bool) -> Self {
        self.reset_password = enabled;
        self
    }

    /// Enables or disables the current-user endpoint (GET /auth/me)
    pub fn me(mut self, enabled: bool) -> Self {
        self.me = enabled;
        self
    }

    /// Enables or disables the track feed endpoint (GET /tracks/feed)
    pub fn track_feed(mut self, enabled: bool) -> Self {
        self.track_feed = enabled;
        self
    }

    /// Enables or disables the track upload endpoint (POST /tracks)
    pub fn create_track(mut self, enabled: bool) -> Self {
        self.create_track = enabled;
        self
    }

    /// Attaches the identity middleware to the built router
    ///
    /// Without this, every request reads as anonymous: /auth/me always
    /// returns null and track uploads are rejected.
    pub fn with_identity(mut self, sessions: Arc<SessionService>) -> Self {
        self.identity = Some(sessions);
        self
    }

    /// Builds the Axum router with the configured routes
    ///
    /// Returns a `Router<AppState>` that can be used with Axum. Only the
    /// enabled routes are registered.
    pub fn build(self) -> Router<AppState> {
        let mut router = Router::new();

        if self.health_check {
            router = router.route("/health", get(health_check));
        }

        if self.signup {
            router = router.route("/auth/signup", post(signup));
        }

        if self.verify_email {
            router = router.route("/auth/verify-email", post(verify_email));
        }

        if self.login {
            router = router.route("/auth/login", post(login));
        }

        if self.forgot_password {
            router = router.route("/auth/forgot-password", post(forgot_password));
        }

        if self.reset_password {
            router = router.route("/auth/reset-password", post(reset_password));
        }

        if self.me {
            router = router.route("/auth/me", get(me));
        }

        if self.track_feed {
            router = router.route("/tracks/feed", get(track_feed));
        }

        if self.create_track {
            router = router.route("/tracks", post(create_track));
        }

        if let Some(sessions) = self.identity {
            router = router.layer(from_fn_with_state(sessions, identity_middleware));
        }

        router
    }
}

/// Creates all API routes with the identity middleware attached
///
/// This is the standard full-service router. It's equivalent to
/// `RouterBuilder::with_all_routes().with_identity(sessions).build()`.
pub fn create_routes(sessions: Arc<SessionService>) -> Router<AppState> {
    RouterBuilder::with_all_routes()
        .with_identity(sessions)
        .build()
}

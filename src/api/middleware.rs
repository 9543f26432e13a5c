//! Identity Middleware
//!
//! Resolves the caller identity from the session cookie, falling back to a
//! bearer token for non-browser clients. Identity is always optional at
//! this layer; handlers and services decide what anonymous callers may do.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::models::session::Identity;
use crate::service::session::{SessionService, SESSION_TTL_HOURS};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "__resonate_token";

/// Extension type for storing the caller identity in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

/// Build the Set-Cookie value for a fresh session token
///
/// Max-Age matches the token's own lifetime, so the cookie and the session
/// expire together. No Secure attribute: local development runs over plain
/// HTTP.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token,
        SESSION_TTL_HOURS * 3600
    )
}

/// Pull the session token from the cookie header, falling back to a bearer
/// Authorization header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(COOKIE).and_then(|value| value.to_str().ok()) {
        for pair in cookies.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(SESSION_COOKIE) {
                if let Some(token) = parts.next() {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Identity middleware that attaches the caller identity when a valid
/// session token is present
///
/// This middleware:
/// 1. Looks for a session token in the cookie, then the Authorization header
/// 2. If the token validates, adds [`CurrentUser`] to request extensions
/// 3. Continues regardless; a bad or missing token just means anonymous
pub async fn identity_middleware(
    State(sessions): State<Arc<SessionService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(&headers) {
        if let Ok(identity) = sessions.identity(&token) {
            request.extensions_mut().insert(CurrentUser(identity));
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRecord;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use chrono::Utc;
    use tower::util::ServiceExt;
    use uuid::Uuid;

    fn sessions() -> Arc<SessionService> {
        Arc::new(SessionService::new("test_secret_key"))
    }

    fn token_for(sessions: &SessionService, username: &str) -> String {
        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            full_name: "Song Bird".to_string(),
            email: "songbird@example.com".to_string(),
            password_hash: "hash".to_string(),
            bio: None,
            profile_image_url: None,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        sessions.issue(&user).unwrap()
    }

    async fn whoami(identity: Option<Extension<CurrentUser>>) -> String {
        match identity {
            Some(Extension(CurrentUser(identity))) => identity.username,
            None => "anonymous".to_string(),
        }
    }

    fn app(sessions: Arc<SessionService>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn_with_state(sessions, identity_middleware))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_session_cookie_shape() {
        let cookie = session_cookie("tok123");
        assert!(cookie.starts_with("__resonate_token=tok123"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_extract_token_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "other=1; __resonate_token=from_cookie; theme=dark".parse().unwrap(),
        );
        headers.insert(AUTHORIZATION, "Bearer from_header".parse().unwrap());

        assert_eq!(extract_token(&headers).as_deref(), Some("from_cookie"));
    }

    #[test]
    fn test_extract_token_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer from_header".parse().unwrap());

        assert_eq!(extract_token(&headers).as_deref(), Some("from_header"));
    }

    #[test]
    fn test_extract_token_ignores_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(extract_token(&headers).is_none());
    }

    #[tokio::test]
    async fn test_anonymous_request_passes_through() {
        let app = app(sessions());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_valid_cookie_attaches_identity() {
        let sessions = sessions();
        let token = token_for(&sessions, "songbird");
        let app = app(sessions);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/whoami")
            .header(COOKIE, format!("__resonate_token={}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_string(response).await, "songbird");
    }

    #[tokio::test]
    async fn test_valid_bearer_attaches_identity() {
        let sessions = sessions();
        let token = token_for(&sessions, "songbird");
        let app = app(sessions);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/whoami")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_string(response).await, "songbird");
    }

    #[tokio::test]
    async fn test_garbage_token_reads_as_anonymous() {
        let app = app(sessions());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/whoami")
            .header(COOKIE, "__resonate_token=not.a.token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }
}

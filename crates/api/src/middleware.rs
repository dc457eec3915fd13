//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use racehub_common::ImageFormatter;
use racehub_core::{AccountDeletionService, CommentService, RaceService, UserService};

/// Name of the session cookie set on sign-in.
pub const SESSION_COOKIE: &str = "token";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub race_service: RaceService,
    pub comment_service: CommentService,
    pub account_deletion_service: AccountDeletionService,
    pub image_formatter: ImageFormatter,
}

fn request_token(req: &Request<Body>) -> Option<String> {
    if let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    CookieJar::from_headers(req.headers())
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Authentication middleware.
///
/// Accepts a bearer token or the session cookie. Unknown tokens leave the
/// request anonymous; handlers that need a user reject it themselves.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = request_token(&req).filter(|t| !t.is_empty()) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::error!(error = %e, "Token lookup failed");
            }
            Err(_) => {
                tracing::debug!("Ignoring unknown session token");
            }
        }
    }

    next.run(req).await
}

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
    ("cross-origin-resource-policy", "cross-origin"),
    ("cross-origin-embedder-policy", "unsafe-none"),
    ("cross-origin-opener-policy", "same-origin-allow-popups"),
];

/// Add the browser security headers to every response.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

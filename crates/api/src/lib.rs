//! HTTP API layer for racehub.
//!
//! - **Endpoints**: JSON routes for races, comments, accounts and moderation
//! - **Extractors**: signed-in and anonymous callers
//! - **Middleware**: token authentication, browser security headers
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use endpoints::router;
use crate::middleware::AppState;

/// The full application: API routes under `/api` with the middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn(middleware::security_headers))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! API endpoints.

mod account;
mod admin;
mod auth;
mod comments;
mod races;

use axum::Router;

use crate::middleware::AppState;

pub use races::RaceResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/races", races::router())
        .nest("/comments", comments::router())
        .nest("/i/account", account::router())
        .nest("/admin", admin::router())
}

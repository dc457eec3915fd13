//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use racehub_common::AppResult;
use racehub_core::CreateUserInput;
use racehub_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::{AppState, SESSION_COOKIE},
    response::ApiResponse,
};

/// Public view of an account.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            is_moderator: user.is_moderator,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Session response returned by signup and signin.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn start_session(
    jar: CookieJar,
    user: user::Model,
) -> (CookieJar, ApiResponse<SessionResponse>) {
    let token = user.token.clone().unwrap_or_default();
    let jar = jar.add(session_cookie(token.clone()));

    (
        jar,
        ApiResponse::ok(SessionResponse {
            user: user.into(),
            token,
        }),
    )
}

/// Signup request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Create a new account and sign it in.
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let input = CreateUserInput {
        username: req.username,
        password: req.password,
    };

    let user = state.user_service.create(input).await?;

    Ok(start_session(jar, user))
}

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SigninRequest>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(start_session(jar, user))
}

/// Signout response.
#[derive(Serialize)]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Sign out. The current token stops working.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<SignoutResponse>)> {
    state.user_service.sign_out(&user).await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    Ok((jar, ApiResponse::ok(SignoutResponse { ok: true })))
}

/// The signed-in account.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/i", post(me))
}

//! Account deletion request endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use racehub_common::AppResult;
use racehub_db::entities::account_deletion_request::{self, DeletionRequestStatus};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Deletion request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequestResponse {
    pub id: String,
    pub user_id: String,
    pub reason: Option<String>,
    pub status: DeletionRequestStatus,
    pub requested_at: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub completed_at: Option<String>,
    pub admin_notes: Option<String>,
}

impl From<account_deletion_request::Model> for DeletionRequestResponse {
    fn from(request: account_deletion_request::Model) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            reason: request.reason,
            status: request.status,
            requested_at: request.requested_at.to_rfc3339(),
            reviewed_by: request.reviewed_by,
            reviewed_at: request.reviewed_at.map(|t| t.to_rfc3339()),
            completed_at: request.completed_at.map(|t| t.to_rfc3339()),
            admin_notes: request.admin_notes,
        }
    }
}

/// Deletion request body.
#[derive(Debug, Default, Deserialize)]
pub struct RequestDeletionRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Ask for the caller's account to be deleted.
async fn request_deletion(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RequestDeletionRequest>,
) -> AppResult<ApiResponse<DeletionRequestResponse>> {
    let request = state
        .account_deletion_service
        .request(&user, req.reason)
        .await?;

    Ok(ApiResponse::created(request.into()))
}

/// The caller's deletion request, or `null`.
async fn deletion_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Option<DeletionRequestResponse>>> {
    let request = state.account_deletion_service.status(&user).await?;
    Ok(ApiResponse::ok(request.map(Into::into)))
}

/// Withdraw a pending deletion request.
async fn cancel_deletion(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    state.account_deletion_service.cancel(&user).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/deletion",
        post(request_deletion)
            .get(deletion_status)
            .delete(cancel_deletion),
    )
}

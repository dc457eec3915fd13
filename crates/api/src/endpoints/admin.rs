//! Admin/Moderation endpoints.
//!
//! Every route takes a JSON body and requires staff rights, which the services
//! check.

use axum::{Json, Router, extract::State, routing::post};
use racehub_common::AppResult;
use racehub_db::entities::account_deletion_request::DeletionRequestStatus;
use serde::{Deserialize, Serialize};

use super::{
    account::DeletionRequestResponse, auth::UserResponse, comments::CommentResponse,
    races::RaceResponse,
};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

const DEFAULT_LIST_LIMIT: u64 = 20;
const MAX_LIST_LIMIT: u64 = 100;

// ========== Races ==========

/// Published races waiting for approval.
async fn pending_races(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<RaceResponse>>> {
    let races = state.race_service.pending_approval(&user).await?;
    Ok(ApiResponse::ok(RaceResponse::many(
        races,
        &state.image_formatter,
    )))
}

/// Single race request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceIdRequest {
    pub race_id: String,
}

async fn approve_race(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RaceIdRequest>,
) -> AppResult<ApiResponse<RaceResponse>> {
    let race = state.race_service.approve(&user, &req.race_id).await?;
    Ok(ApiResponse::ok(RaceResponse::new(
        race,
        &state.image_formatter,
    )))
}

async fn unapprove_race(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RaceIdRequest>,
) -> AppResult<ApiResponse<RaceResponse>> {
    let race = state.race_service.unapprove(&user, &req.race_id).await?;
    Ok(ApiResponse::ok(RaceResponse::new(
        race,
        &state.image_formatter,
    )))
}

/// Bulk race request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRaceRequest {
    pub race_ids: Vec<String>,
}

/// Bulk action response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionResponse {
    /// Races whose approval actually changed.
    pub updated: u64,
    pub message: String,
}

impl BulkActionResponse {
    fn new(updated: u64, action: &str) -> Self {
        let noun = if updated == 1 { "race" } else { "races" };
        Self {
            updated,
            message: format!("{updated} {noun} {action}."),
        }
    }
}

async fn bulk_approve_races(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BulkRaceRequest>,
) -> AppResult<ApiResponse<BulkActionResponse>> {
    let updated = state.race_service.bulk_approve(&user, &req.race_ids).await?;
    Ok(ApiResponse::ok(BulkActionResponse::new(updated, "approved")))
}

async fn bulk_unapprove_races(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BulkRaceRequest>,
) -> AppResult<ApiResponse<BulkActionResponse>> {
    let updated = state
        .race_service
        .bulk_unapprove(&user, &req.race_ids)
        .await?;
    Ok(ApiResponse::ok(BulkActionResponse::new(updated, "unapproved")))
}

// ========== Comments ==========

/// Comment moderation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentIdRequest {
    pub comment_id: String,
}

async fn hide_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .set_approved(&user, &req.comment_id, false)
        .await?;
    Ok(ApiResponse::ok(comment.into()))
}

async fn unhide_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .set_approved(&user, &req.comment_id, true)
        .await?;
    Ok(ApiResponse::ok(comment.into()))
}

// ========== Account deletion ==========

/// List deletion requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDeletionRequestsRequest {
    pub status: Option<DeletionRequestStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

async fn list_deletion_requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListDeletionRequestsRequest>,
) -> AppResult<ApiResponse<Vec<DeletionRequestResponse>>> {
    let limit = req.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let offset = req.offset.unwrap_or(0);

    let requests = state
        .account_deletion_service
        .list(&user, req.status, limit, offset)
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Review a deletion request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDeletionRequest {
    pub request_id: String,
    pub notes: Option<String>,
}

async fn approve_deletion_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewDeletionRequest>,
) -> AppResult<ApiResponse<DeletionRequestResponse>> {
    let request = state
        .account_deletion_service
        .approve(&user, &req.request_id, req.notes)
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

async fn reject_deletion_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewDeletionRequest>,
) -> AppResult<ApiResponse<DeletionRequestResponse>> {
    let request = state
        .account_deletion_service
        .reject(&user, &req.request_id, req.notes)
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

/// Complete an approved deletion request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteDeletionRequest {
    pub request_id: String,
}

async fn complete_deletion_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CompleteDeletionRequest>,
) -> AppResult<ApiResponse<DeletionRequestResponse>> {
    let request = state
        .account_deletion_service
        .complete(&user, &req.request_id)
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

// ========== Users ==========

/// Grant or revoke moderator rights.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetModeratorRequest {
    pub user_id: String,
    pub is_moderator: bool,
}

async fn set_moderator(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetModeratorRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let target = state
        .user_service
        .set_moderator(&user, &req.user_id, req.is_moderator)
        .await?;
    Ok(ApiResponse::ok(target.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Races
        .route("/races/pending", post(pending_races))
        .route("/races/approve", post(approve_race))
        .route("/races/unapprove", post(unapprove_race))
        .route("/races/bulk-approve", post(bulk_approve_races))
        .route("/races/bulk-unapprove", post(bulk_unapprove_races))
        // Comments
        .route("/comments/hide", post(hide_comment))
        .route("/comments/unhide", post(unhide_comment))
        // Account deletion
        .route("/deletion-requests/list", post(list_deletion_requests))
        .route("/deletion-requests/approve", post(approve_deletion_request))
        .route("/deletion-requests/reject", post(reject_deletion_request))
        .route("/deletion-requests/complete", post(complete_deletion_request))
        // Users
        .route("/users/set-moderator", post(set_moderator))
}

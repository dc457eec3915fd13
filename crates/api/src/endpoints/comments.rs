//! Comment endpoints.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::delete,
};
use racehub_common::AppResult;
use racehub_db::entities::comment;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::no_content,
};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub race_id: String,
    pub author_id: String,
    pub body: String,
    pub short_body: String,
    pub is_recent: bool,
    pub approved: bool,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            short_body: comment.short_body(),
            is_recent: comment.is_recent(),
            created_at: comment.created_at.to_rfc3339(),
            id: comment.id,
            race_id: comment.race_id,
            author_id: comment.author_id,
            body: comment.body,
            approved: comment.approved,
        }
    }
}

/// Add comment request.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub body: String,
}

/// Delete one of the caller's comments.
async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.comment_service.delete(&user, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(delete_comment))
}

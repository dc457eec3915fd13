//! Race endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use racehub_common::{AppResult, ImageFormatter};
use racehub_core::{CreateRaceInput, PageInfo, RacePage, UpdateRaceInput};
use racehub_db::entities::race;
use serde::{Deserialize, Serialize};

use super::comments::{AddCommentRequest, CommentResponse};
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Race response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResponse {
    pub id: String,
    pub name: String,
    pub display: String,
    pub description: String,
    pub distance: race::Distance,
    pub custom_distance: Option<String>,
    pub distance_label: String,
    pub difficulty: race::Difficulty,
    pub difficulty_label: &'static str,
    pub race_date: String,
    pub days_until_race: i64,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_coordinates: bool,
    pub registration_link: Option<String>,
    pub image_url: Option<String>,
    pub status: race::RaceStatus,
    pub approved: bool,
    pub is_visible_to_public: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

impl RaceResponse {
    /// Build the response, resolving the stored image through `images`.
    #[must_use]
    pub fn new(race: race::Model, images: &ImageFormatter) -> Self {
        Self {
            display: race.to_string(),
            distance_label: race.distance_label(),
            difficulty_label: race.difficulty.label(),
            race_date: race.race_date.to_string(),
            days_until_race: race.days_until_race(),
            has_coordinates: race.has_coordinates(),
            image_url: images.url_for(race.image.as_deref()),
            is_visible_to_public: race.is_visible_to_public(),
            approved_at: race.approved_at.map(|t| t.to_rfc3339()),
            created_at: race.created_at.to_rfc3339(),
            id: race.id,
            name: race.name,
            description: race.description,
            distance: race.distance,
            custom_distance: race.custom_distance,
            difficulty: race.difficulty,
            city: race.city,
            country: race.country,
            latitude: race.latitude,
            longitude: race.longitude,
            registration_link: race.registration_link,
            status: race.status,
            approved: race.approved,
            approved_by: race.approved_by,
            created_by: race.created_by,
        }
    }

    pub(crate) fn many(races: Vec<race::Model>, images: &ImageFormatter) -> Vec<Self> {
        races.into_iter().map(|r| Self::new(r, images)).collect()
    }
}

/// Pagination block of a listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoResponse {
    pub page: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub has_other_pages: bool,
}

impl From<PageInfo> for PageInfoResponse {
    fn from(info: PageInfo) -> Self {
        Self {
            page: info.page,
            num_pages: info.num_pages,
            total_items: info.total_items,
            page_size: info.page_size,
            has_next: info.has_next(),
            has_previous: info.has_previous(),
            has_other_pages: info.has_other_pages(),
        }
    }
}

/// Listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RacePageResponse {
    pub races: Vec<RaceResponse>,
    pub page_info: PageInfoResponse,
}

impl RacePageResponse {
    fn new(page: RacePage, images: &ImageFormatter) -> Self {
        Self {
            races: RaceResponse::many(page.races, images),
            page_info: page.page_info.into(),
        }
    }
}

/// Listing query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub difficulty: Option<String>,
}

/// List races visible to the caller.
async fn list(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<RacePageResponse>> {
    let page = state
        .race_service
        .list(
            &user.viewer(),
            query.difficulty.as_deref(),
            query.page.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(RacePageResponse::new(
        page,
        &state.image_formatter,
    )))
}

/// List the caller's own races, drafts and unapproved included.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<RacePageResponse>> {
    let page = state
        .race_service
        .list_mine(&user, query.page.as_deref())
        .await?;

    Ok(ApiResponse::ok(RacePageResponse::new(
        page,
        &state.image_formatter,
    )))
}

/// Race detail response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceDetailResponse {
    pub race: RaceResponse,
    pub comments: Vec<CommentResponse>,
    pub comment_count: usize,
}

/// Show a race with its comments.
async fn show(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RaceDetailResponse>> {
    let detail = state.race_service.get_detail(&user.viewer(), &id).await?;

    let comments: Vec<CommentResponse> = detail.comments.into_iter().map(Into::into).collect();

    Ok(ApiResponse::ok(RaceDetailResponse {
        race: RaceResponse::new(detail.race, &state.image_formatter),
        comment_count: comments.len(),
        comments,
    }))
}

/// Create race response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRaceResponse {
    pub race: RaceResponse,
    pub message: String,
}

/// Submit a new race.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRaceInput>,
) -> AppResult<ApiResponse<CreatedRaceResponse>> {
    let created = state.race_service.create(&user, input).await?;

    Ok(ApiResponse::created(CreatedRaceResponse {
        race: RaceResponse::new(created.race, &state.image_formatter),
        message: created.message,
    }))
}

/// Edit a race.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRaceInput>,
) -> AppResult<ApiResponse<RaceResponse>> {
    let race = state.race_service.update(&user, &id, input).await?;

    Ok(ApiResponse::ok(RaceResponse::new(
        race,
        &state.image_formatter,
    )))
}

/// Delete a race.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.race_service.delete(&user, &id).await?;
    Ok(no_content())
}

/// Comment on a race.
async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.add(&user, &id, &req.body).await?;
    Ok(ApiResponse::created(comment.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mine", get(mine))
        .route("/{id}", get(show).patch(update).delete(delete))
        .route("/{id}/comments", post(add_comment))
}

//! Race service: listing, detail, authoring and approval.

use chrono::{NaiveDate, Utc};
use racehub_common::{AppError, AppResult, IdGenerator};
use racehub_db::{
    entities::{
        comment,
        race::{self, Difficulty, Distance, RaceStatus},
        user,
    },
    repositories::{CommentRepository, RaceRepository},
};
use sea_orm::{Select, Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use super::require_admin;
use crate::{
    moderation::{approve_race, unapprove_race},
    policy::{
        Viewer, can_modify, clamp_page, has_admin_capability, is_visible, listing_query,
        my_races_query, parse_difficulty_filter, parse_page,
    },
};

/// Input for creating a race.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRaceInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1))]
    pub description: String,

    pub distance: Distance,

    #[validate(length(max = 50))]
    pub custom_distance: Option<String>,

    pub difficulty: Difficulty,

    pub race_date: NaiveDate,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(min = 1, max = 50))]
    pub country: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    /// A blank link is treated as no link.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url, length(max = 1024))]
    pub registration_link: Option<String>,

    /// Hosted image public ID.
    #[validate(length(max = 512))]
    pub image: Option<String>,
}

/// Input for editing a race. Absent fields are left alone; `null` clears the
/// optional ones.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRaceInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    pub distance: Option<Distance>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 50))]
    pub custom_distance: Option<Option<String>>,

    pub difficulty: Option<Difficulty>,

    pub race_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub latitude: Option<Option<f64>>,

    #[serde(default, deserialize_with = "double_option")]
    pub longitude: Option<Option<f64>>,

    #[serde(default, deserialize_with = "blank_as_null")]
    #[validate(url, length(max = 1024))]
    pub registration_link: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 512))]
    pub image: Option<Option<String>>,

    /// Move between draft and published. Approval is untouched.
    pub status: Option<RaceStatus>,
}

/// Distinguish an explicit `null` from an absent field.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Like `double_option`, but a blank string clears the field.
fn blank_as_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none(deserializer).map(Some)
}

/// "Other" needs a custom distance.
fn check_custom_distance(distance: Distance, custom: Option<&str>) -> AppResult<()> {
    if distance == Distance::Other && custom.is_none_or(|c| c.trim().is_empty()) {
        let mut errors = ValidationErrors::new();
        errors.add(
            "custom_distance",
            ValidationError::new("required").with_message(
                "Please specify custom distance when 'Other' is selected.".into(),
            ),
        );
        return Err(errors.into());
    }
    Ok(())
}

fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    if latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat))
        || longitude.is_some_and(|lon| !(-180.0..=180.0).contains(&lon))
    {
        return Err(AppError::Validation(
            "Coordinates are out of range".to_string(),
        ));
    }
    Ok(())
}

/// Pagination details for a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Current page, 1-based.
    pub page: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub page_size: u64,
}

impl PageInfo {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }
}

/// One page of races.
#[derive(Debug, Clone)]
pub struct RacePage {
    pub races: Vec<race::Model>,
    pub page_info: PageInfo,
}

/// A race together with its visible comments.
#[derive(Debug, Clone)]
pub struct RaceDetail {
    pub race: race::Model,
    /// Approved comments, newest first.
    pub comments: Vec<comment::Model>,
}

/// Result of creating a race.
#[derive(Debug, Clone)]
pub struct CreatedRace {
    pub race: race::Model,
    pub message: String,
}

/// Race service for business logic.
#[derive(Clone)]
pub struct RaceService {
    race_repo: RaceRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
    page_size: u64,
}

impl RaceService {
    /// Create a new race service.
    #[must_use]
    pub const fn new(
        race_repo: RaceRepository,
        comment_repo: CommentRepository,
        page_size: u64,
    ) -> Self {
        Self {
            race_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
            page_size,
        }
    }

    // ========== Listing ==========

    /// Races the viewer may see, filtered by difficulty, earliest race first.
    pub async fn list(
        &self,
        viewer: &Viewer,
        difficulty: Option<&str>,
        page: Option<&str>,
    ) -> AppResult<RacePage> {
        let difficulty = parse_difficulty_filter(difficulty)?;
        self.paginate(listing_query(viewer, difficulty), page).await
    }

    /// Every race the user created, newest first.
    pub async fn list_mine(&self, user: &user::Model, page: Option<&str>) -> AppResult<RacePage> {
        self.paginate(my_races_query(&user.id), page).await
    }

    async fn paginate(&self, query: Select<race::Entity>, page: Option<&str>) -> AppResult<RacePage> {
        let page_size = self.page_size.max(1);
        let counts = self.race_repo.count_pages(query.clone(), page_size).await?;

        let num_pages = counts.number_of_pages.max(1);
        let page = clamp_page(parse_page(page), num_pages);

        let races = self
            .race_repo
            .fetch_page(query, page_size, page - 1)
            .await?;

        Ok(RacePage {
            races,
            page_info: PageInfo {
                page,
                num_pages,
                total_items: counts.number_of_items,
                page_size,
            },
        })
    }

    // ========== Detail ==========

    /// Fetch a race for the detail view.
    ///
    /// Drafts are never returned here, not even to their creator. Missing and
    /// hidden races produce the same error.
    pub async fn get(&self, viewer: &Viewer, id: &str) -> AppResult<race::Model> {
        let race = self
            .race_repo
            .find_published_by_id(id)
            .await?
            .ok_or_else(AppError::race_not_found)?;

        if !is_visible(&race, viewer) {
            return Err(AppError::race_not_found());
        }

        Ok(race)
    }

    /// Race detail with its approved comments.
    pub async fn get_detail(&self, viewer: &Viewer, id: &str) -> AppResult<RaceDetail> {
        let race = self.get(viewer, id).await?;
        let comments = self.comment_repo.find_approved_by_race(&race.id).await?;

        Ok(RaceDetail { race, comments })
    }

    // ========== Authoring ==========

    /// Create a race. It starts published and awaiting approval.
    pub async fn create(&self, user: &user::Model, input: CreateRaceInput) -> AppResult<CreatedRace> {
        input.validate()?;
        check_custom_distance(input.distance, input.custom_distance.as_deref())?;

        let model = race::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            distance: Set(input.distance),
            custom_distance: Set(input.custom_distance.filter(|c| !c.trim().is_empty())),
            difficulty: Set(input.difficulty),
            race_date: Set(input.race_date),
            city: Set(input.city.trim().to_string()),
            country: Set(input.country.unwrap_or_else(|| "UK".to_string())),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            registration_link: Set(input.registration_link),
            image: Set(input.image.filter(|i| !i.is_empty())),
            status: Set(RaceStatus::Published),
            approved: Set(false),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(user.id.clone()),
            created_at: Set(Utc::now().into()),
        };

        let race = self.race_repo.create(model).await?;

        tracing::info!(race_id = %race.id, user_id = %user.id, "Race created");

        let message = if has_admin_capability(user) {
            format!("Race \"{}\" created and published!", race.name)
        } else {
            format!(
                "Race \"{}\" created! It will be visible to others once approved by admin.",
                race.name
            )
        };

        Ok(CreatedRace { race, message })
    }

    /// Load a race the user intends to change.
    ///
    /// Races the user cannot see are reported missing; visible races they do
    /// not own are forbidden.
    async fn get_for_modification(&self, user: &user::Model, id: &str) -> AppResult<race::Model> {
        let viewer = Viewer::from_user(Some(user));
        let race = self
            .race_repo
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::race_not_found)?;

        if !is_visible(&race, &viewer) {
            return Err(AppError::race_not_found());
        }
        if !can_modify(&race, &viewer) {
            return Err(AppError::Forbidden(
                "You can only modify your own races".to_string(),
            ));
        }

        Ok(race)
    }

    /// Edit a race. Creator or staff only.
    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateRaceInput,
    ) -> AppResult<race::Model> {
        input.validate()?;

        let race = self.get_for_modification(user, id).await?;

        let distance = input.distance.unwrap_or(race.distance);
        let custom_distance = input
            .custom_distance
            .clone()
            .unwrap_or_else(|| race.custom_distance.clone());
        check_custom_distance(distance, custom_distance.as_deref())?;

        let latitude = input.latitude.unwrap_or(race.latitude);
        let longitude = input.longitude.unwrap_or(race.longitude);
        check_coordinates(latitude, longitude)?;

        let mut model: race::ActiveModel = race.into();

        if let Some(name) = input.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if input.distance.is_some() {
            model.distance = Set(distance);
        }
        if input.custom_distance.is_some() {
            model.custom_distance = Set(custom_distance.filter(|c| !c.trim().is_empty()));
        }
        if let Some(difficulty) = input.difficulty {
            model.difficulty = Set(difficulty);
        }
        if let Some(race_date) = input.race_date {
            model.race_date = Set(race_date);
        }
        if let Some(city) = input.city {
            model.city = Set(city.trim().to_string());
        }
        if let Some(country) = input.country {
            model.country = Set(country);
        }
        if input.latitude.is_some() {
            model.latitude = Set(latitude);
        }
        if input.longitude.is_some() {
            model.longitude = Set(longitude);
        }
        if let Some(link) = input.registration_link {
            model.registration_link = Set(link);
        }
        if let Some(image) = input.image {
            model.image = Set(image.filter(|i| !i.is_empty()));
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }

        let race = self.race_repo.update(model).await?;

        tracing::info!(race_id = %race.id, user_id = %user.id, "Race updated");

        Ok(race)
    }

    /// Delete a race and its comments. Creator or staff only.
    pub async fn delete(&self, user: &user::Model, id: &str) -> AppResult<()> {
        let race = self.get_for_modification(user, id).await?;

        self.race_repo.delete(&race.id).await?;

        tracing::info!(race_id = %race.id, user_id = %user.id, "Race deleted");

        Ok(())
    }

    // ========== Approval ==========

    /// Published races waiting for approval.
    pub async fn pending_approval(&self, admin: &user::Model) -> AppResult<Vec<race::Model>> {
        require_admin(admin)?;
        self.race_repo.find_pending_approval().await
    }

    /// Approve one race. Approving an approved race changes nothing.
    pub async fn approve(&self, admin: &user::Model, id: &str) -> AppResult<race::Model> {
        require_admin(admin)?;

        let race = self
            .race_repo
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::race_not_found)?;

        match approve_race(&race, &admin.id, Utc::now().into()) {
            Some(model) => {
                let race = self.race_repo.update(model).await?;
                tracing::info!(race_id = %race.id, admin_id = %admin.id, "Race approved");
                Ok(race)
            }
            None => Ok(race),
        }
    }

    /// Withdraw approval from one race.
    pub async fn unapprove(&self, admin: &user::Model, id: &str) -> AppResult<race::Model> {
        require_admin(admin)?;

        let race = self
            .race_repo
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::race_not_found)?;

        match unapprove_race(&race) {
            Some(model) => {
                let race = self.race_repo.update(model).await?;
                tracing::info!(race_id = %race.id, admin_id = %admin.id, "Race unapproved");
                Ok(race)
            }
            None => Ok(race),
        }
    }

    /// Approve many races at once. Returns how many actually changed.
    pub async fn bulk_approve(&self, admin: &user::Model, ids: &[String]) -> AppResult<u64> {
        require_admin(admin)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let changed = self
            .race_repo
            .apply_to_many(ids, |race| approve_race(race, &admin.id, now))
            .await?;

        tracing::info!(admin_id = %admin.id, requested = ids.len(), changed, "Races bulk approved");

        Ok(changed)
    }

    /// Withdraw approval from many races at once. Returns how many actually changed.
    pub async fn bulk_unapprove(&self, admin: &user::Model, ids: &[String]) -> AppResult<u64> {
        require_admin(admin)?;

        let changed = self.race_repo.apply_to_many(ids, unapprove_race).await?;

        tracing::info!(admin_id = %admin.id, requested = ids.len(), changed, "Races bulk unapproved");

        Ok(changed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_string(),
            password_hash: None,
            token: None,
            is_admin,
            is_moderator: false,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_race(id: &str, created_by: &str, approved: bool) -> race::Model {
        race::Model {
            id: id.to_string(),
            name: "Midnight 10K".to_string(),
            description: "Headtorch required".to_string(),
            distance: Distance::Other,
            custom_distance: Some("10K".to_string()),
            difficulty: Difficulty::AdultsOnly,
            race_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            city: "Leeds".to_string(),
            country: "UK".to_string(),
            latitude: None,
            longitude: None,
            registration_link: None,
            image: None,
            status: RaceStatus::Published,
            approved,
            approved_by: None,
            approved_at: None,
            created_by: created_by.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_input(distance: Distance, custom: Option<&str>) -> CreateRaceInput {
        CreateRaceInput {
            name: "Midnight 10K".to_string(),
            description: "Headtorch required".to_string(),
            distance,
            custom_distance: custom.map(ToString::to_string),
            difficulty: Difficulty::AdultsOnly,
            race_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            city: "Leeds".to_string(),
            country: None,
            latitude: None,
            longitude: None,
            registration_link: None,
            image: None,
        }
    }

    fn service(db: DatabaseConnection) -> RaceService {
        let db = Arc::new(db);
        RaceService::new(
            RaceRepository::new(db.clone()),
            CommentRepository::new(db),
            6,
        )
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    #[tokio::test]
    async fn test_owner_sees_unapproved_race_in_listing() {
        let race = create_test_race("race1", "owner", false);
        let owner = create_test_user("owner", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .append_query_results([[race.clone()]])
                .into_connection(),
        );

        let page = service
            .list(&Viewer::from_user(Some(&owner)), None, None)
            .await
            .unwrap();

        assert_eq!(page.races, vec![race]);
        assert_eq!(page.page_info.page, 1);
        assert!(!page.page_info.has_other_pages());
    }

    #[tokio::test]
    async fn test_out_of_range_page_clamps_to_last() {
        let race = create_test_race("race13", "owner", true);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(13)]])
                .append_query_results([[race]])
                .into_connection(),
        );

        let page = service
            .list(&Viewer::Anonymous, Some("ALL"), Some("42"))
            .await
            .unwrap();

        assert_eq!(page.page_info.page, 3);
        assert_eq!(page.page_info.num_pages, 3);
        assert!(page.page_info.has_previous());
        assert!(!page.page_info.has_next());
    }

    #[tokio::test]
    async fn test_empty_listing_has_one_page() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .append_query_results([Vec::<race::Model>::new()])
                .into_connection(),
        );

        let page = service
            .list(&Viewer::Anonymous, None, Some("abc"))
            .await
            .unwrap();

        assert!(page.races.is_empty());
        assert_eq!(page.page_info.page, 1);
        assert_eq!(page.page_info.num_pages, 1);
    }

    #[tokio::test]
    async fn test_invalid_difficulty_rejected() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.list(&Viewer::Anonymous, Some("HARD"), None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_anonymous_cannot_open_unapproved_race() {
        let race = create_test_race("race1", "owner", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[race]])
                .into_connection(),
        );

        let err = service.get(&Viewer::Anonymous, "race1").await.unwrap_err();

        assert_eq!(err.to_string(), AppError::race_not_found().to_string());
    }

    #[tokio::test]
    async fn test_creator_cannot_open_own_draft() {
        let owner = create_test_user("owner", false);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<race::Model>::new()])
                .into_connection(),
        );
        let service = RaceService::new(
            RaceRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
            6,
        );

        let err = service
            .get(&Viewer::from_user(Some(&owner)), "draft1")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), AppError::race_not_found().to_string());

        drop(service);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = log[0].statements()[0].to_string();
        assert!(sql.contains(r#""race"."status" = 1"#), "{sql}");
    }

    #[tokio::test]
    async fn test_create_other_requires_custom_distance() {
        let user = create_test_user("user1", false);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .create(&user, create_input(Distance::Other, Some("  ")))
            .await;

        match result {
            Err(AppError::Validation(message)) => assert!(message.contains("custom_distance")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_overlong_registration_link() {
        let user = create_test_user("user1", false);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let mut input = create_input(Distance::FiveK, None);
        input.registration_link = Some(format!("https://example.com/{}", "a".repeat(1024)));

        match service.create(&user, input).await {
            Err(AppError::Validation(message)) => assert!(message.contains("registration_link")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_registration_link_means_no_link() {
        let input: CreateRaceInput = serde_json::from_value(serde_json::json!({
            "name": "Midnight 10K",
            "description": "Headtorch required",
            "distance": "5K",
            "difficulty": "ADULTS_ONLY",
            "raceDate": "2025-12-01",
            "city": "Leeds",
            "registrationLink": "  "
        }))
        .unwrap();
        assert_eq!(input.registration_link, None);
        assert!(input.validate().is_ok());

        let update: UpdateRaceInput =
            serde_json::from_value(serde_json::json!({ "registrationLink": "" })).unwrap();
        assert_eq!(update.registration_link, Some(None));
        assert!(update.validate().is_ok());

        let untouched: UpdateRaceInput = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(untouched.registration_link, None);
    }

    #[tokio::test]
    async fn test_update_applies_create_field_rules() {
        let owner = create_test_user("owner", false);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = UpdateRaceInput {
            custom_distance: Some(Some("x".repeat(80))),
            registration_link: Some(Some("not a url".to_string())),
            image: Some(Some("i".repeat(600))),
            ..UpdateRaceInput::default()
        };

        match service.update(&owner, "race1", input).await {
            Err(AppError::Validation(message)) => {
                assert!(message.contains("custom_distance"));
                assert!(message.contains("registration_link"));
                assert!(message.contains("image"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_starts_published_and_unapproved() {
        let user = create_test_user("user1", false);
        let stored = create_test_race("race1", "user1", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored]])
                .into_connection(),
        );

        let created = service
            .create(&user, create_input(Distance::Other, Some("10K")))
            .await
            .unwrap();

        assert_eq!(created.race.status, RaceStatus::Published);
        assert!(!created.race.approved);
        assert!(created.message.contains("once approved by admin"));
    }

    #[tokio::test]
    async fn test_admin_create_message() {
        let admin = create_test_user("admin", true);
        let stored = create_test_race("race1", "admin", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored]])
                .into_connection(),
        );

        let created = service
            .create(&admin, create_input(Distance::FiveK, None))
            .await
            .unwrap();

        assert_eq!(created.message, "Race \"Midnight 10K\" created and published!");
    }

    #[tokio::test]
    async fn test_non_owner_cannot_edit_public_race() {
        let race = create_test_race("race1", "owner", true);
        let stranger = create_test_user("stranger", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[race]])
                .into_connection(),
        );

        let result = service
            .update(&stranger, "race1", UpdateRaceInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_see_hidden_race_to_delete() {
        let race = create_test_race("race1", "owner", false);
        let stranger = create_test_user("stranger", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[race]])
                .into_connection(),
        );

        let result = service.delete(&stranger, "race1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_deletes_race() {
        let race = create_test_race("race1", "owner", false);
        let owner = create_test_user("owner", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[race]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        assert!(service.delete(&owner, "race1").await.is_ok());
    }

    #[tokio::test]
    async fn test_bulk_approve_counts_only_changes() {
        let admin = create_test_user("admin", true);
        let r1 = create_test_race("r1", "owner", false);
        let r2 = create_test_race("r2", "owner", true);
        let r3 = create_test_race("r3", "owner", false);

        let mut r1_done = r1.clone();
        r1_done.approved = true;
        let mut r3_done = r3.clone();
        r3_done.approved = true;

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![r1, r2, r3]])
                .append_query_results([[r1_done]])
                .append_query_results([[r3_done]])
                .into_connection(),
        );

        let ids = vec!["r1".to_string(), "r2".to_string(), "r3".to_string()];
        let changed = service.bulk_approve(&admin, &ids).await.unwrap();

        assert_eq!(changed, 2);
    }

    // Two admins acting on the same race at once: each reads its own snapshot
    // and writes without a version check, so the later write wins. Known race;
    // both calls report a change.
    #[tokio::test]
    async fn test_concurrent_approve_and_unapprove_last_writer_wins() {
        let admin_a = create_test_user("admin_a", true);
        let admin_b = create_test_user("admin_b", true);

        let pending = create_test_race("r1", "owner", false);
        let mut approved = pending.clone();
        approved.approved = true;
        approved.approved_by = Some("admin_a".to_string());
        let unapproved = pending.clone();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![pending]])
                .append_query_results([vec![approved.clone()]])
                .append_query_results([vec![approved]])
                .append_query_results([vec![unapproved]])
                .into_connection(),
        );
        let service = RaceService::new(
            RaceRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
            6,
        );

        let ids = vec!["r1".to_string()];
        assert_eq!(service.bulk_approve(&admin_a, &ids).await.unwrap(), 1);
        assert_eq!(service.bulk_unapprove(&admin_b, &ids).await.unwrap(), 1);

        drop(service);
        let last_update = Arc::try_unwrap(db)
            .unwrap()
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(ToString::to_string))
            .rfind(|sql| sql.starts_with("UPDATE"))
            .unwrap();
        assert!(last_update.contains(r#""approved" = FALSE"#), "{last_update}");
    }

    #[tokio::test]
    async fn test_approval_requires_staff() {
        let user = create_test_user("user1", false);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.approve(&user, "race1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approve_already_approved_writes_nothing() {
        let admin = create_test_user("admin2", true);
        let mut race = create_test_race("race1", "owner", true);
        race.approved_by = Some("admin1".to_string());

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[race]])
                .into_connection(),
        );

        let result = service.approve(&admin, "race1").await.unwrap();

        assert_eq!(result.approved_by.as_deref(), Some("admin1"));
    }

    #[tokio::test]
    async fn test_pending_queue_for_moderator() {
        let mut moderator = create_test_user("mod1", false);
        moderator.is_moderator = true;

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_race("race1", "owner", false)]])
                .into_connection(),
        );

        let pending = service.pending_approval(&moderator).await.unwrap();

        assert_eq!(pending.len(), 1);
        assert!(!pending[0].approved);
    }
}

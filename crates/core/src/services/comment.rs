//! Comment service.

use chrono::Utc;
use racehub_common::{AppError, AppResult, IdGenerator};
use racehub_db::{
    entities::{
        comment::{self, MAX_BODY_LENGTH},
        user,
    },
    repositories::{CommentRepository, RaceRepository},
};
use sea_orm::Set;

use super::require_admin;
use crate::policy::{Viewer, is_visible};

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    race_repo: RaceRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, race_repo: RaceRepository) -> Self {
        Self {
            comment_repo,
            race_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a race the user can open.
    pub async fn add(
        &self,
        author: &user::Model,
        race_id: &str,
        body: &str,
    ) -> AppResult<comment::Model> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        if body.chars().count() > MAX_BODY_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment cannot be longer than {MAX_BODY_LENGTH} characters"
            )));
        }

        let race = self
            .race_repo
            .find_published_by_id(race_id)
            .await?
            .ok_or_else(AppError::race_not_found)?;

        if !is_visible(&race, &Viewer::from_user(Some(author))) {
            return Err(AppError::race_not_found());
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            race_id: Set(race.id),
            author_id: Set(author.id.clone()),
            body: Set(body.to_string()),
            created_at: Set(Utc::now().into()),
            approved: Set(true),
        };

        let comment = self.comment_repo.create(model).await?;

        tracing::info!(
            comment_id = %comment.id,
            race_id = %comment.race_id,
            user_id = %author.id,
            "Comment added"
        );

        Ok(comment)
    }

    /// Delete a comment. Only its author may do this.
    pub async fn delete(&self, user: &user::Model, comment_id: &str) -> AppResult<comment::Model> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.author_id != user.id {
            return Err(AppError::Forbidden(
                "You can only delete your own comments!".to_string(),
            ));
        }

        self.comment_repo.delete(&comment.id).await?;

        tracing::info!(comment_id = %comment.id, user_id = %user.id, "Comment deleted");

        Ok(comment)
    }

    /// Hide or show a comment on its race page.
    pub async fn set_approved(
        &self,
        admin: &user::Model,
        comment_id: &str,
        approved: bool,
    ) -> AppResult<comment::Model> {
        require_admin(admin)?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.approved == approved {
            return Ok(comment);
        }

        let mut model: comment::ActiveModel = comment.into();
        model.approved = Set(approved);
        let comment = self.comment_repo.update(model).await?;

        tracing::info!(
            comment_id = %comment.id,
            admin_id = %admin.id,
            approved,
            "Comment moderation changed"
        );

        Ok(comment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use racehub_db::entities::race::{self, Difficulty, Distance, RaceStatus};
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

    fn create_test_comment(id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            race_id: "race1".to_string(),
            author_id: author_id.to_string(),
            body: "Great course".to_string(),
            created_at: Utc::now().into(),
            approved: true,
        }
    }

    fn create_test_race(approved: bool) -> race::Model {
        race::Model {
            id: "race1".to_string(),
            name: "Cheese Roll".to_string(),
            description: "Downhill".to_string(),
            distance: Distance::Other,
            custom_distance: Some("200m".to_string()),
            difficulty: Difficulty::CrazyTough,
            race_date: NaiveDate::from_ymd_opt(2026, 5, 25).unwrap(),
            city: "Brockworth".to_string(),
            country: "UK".to_string(),
            latitude: None,
            longitude: None,
            registration_link: None,
            image: None,
            status: RaceStatus::Published,
            approved,
            approved_by: None,
            approved_at: None,
            created_by: "owner".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: DatabaseConnection) -> CommentService {
        let db = Arc::new(db);
        CommentService::new(CommentRepository::new(db.clone()), RaceRepository::new(db))
    }

    #[tokio::test]
    async fn test_author_deletes_own_comment() {
        let author = create_test_user("author", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let deleted = service.delete(&author, "c1").await.unwrap();
        assert_eq!(deleted.id, "c1");
    }

    #[tokio::test]
    async fn test_non_author_cannot_delete() {
        let admin = create_test_user("admin", true);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author")]])
                .into_connection(),
        );

        let result = service.delete(&admin, "c1").await;

        match result {
            Err(AppError::Forbidden(message)) => {
                assert_eq!(message, "You can only delete your own comments!");
            }
            other => panic!("expected forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let author = create_test_user("author", false);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.add(&author, "race1", "   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_overlong_comment_rejected() {
        let author = create_test_user("author", false);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let body = "x".repeat(MAX_BODY_LENGTH + 1);
        let result = service.add(&author, "race1", &body).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cannot_comment_on_hidden_race() {
        let stranger = create_test_user("stranger", false);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_race(false)]])
                .into_connection(),
        );

        let result = service.add(&stranger, "race1", "Hello").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_comment_on_public_race() {
        let author = create_test_user("author", false);
        let stored = create_test_comment("c1", "author");

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_race(true)]])
                .append_query_results([[stored]])
                .into_connection(),
        );

        let comment = service.add(&author, "race1", "  Great course  ").await.unwrap();

        assert_eq!(comment.race_id, "race1");
        assert!(comment.approved);
    }

    #[tokio::test]
    async fn test_hide_requires_staff() {
        let user = create_test_user("user1", false);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.set_approved(&user, "c1", false).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}

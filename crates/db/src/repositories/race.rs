//! Race repository.

use std::sync::Arc;

use crate::entities::{
    Race,
    race::{self, RaceStatus},
};
use racehub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ItemsAndPagesNumber,
    PaginatorTrait, QueryFilter, QueryOrder, Select, TransactionTrait,
};

/// Race repository for database operations.
#[derive(Clone)]
pub struct RaceRepository {
    db: Arc<DatabaseConnection>,
}

impl RaceRepository {
    /// Create a new race repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a race by ID, whatever its status.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<race::Model>> {
        Race::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a published race by ID. Drafts are never returned.
    pub async fn find_published_by_id(&self, id: &str) -> AppResult<Option<race::Model>> {
        Race::find_by_id(id)
            .filter(race::Column::Status.eq(RaceStatus::Published))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published races still waiting for approval, earliest race first.
    pub async fn find_pending_approval(&self) -> AppResult<Vec<race::Model>> {
        Race::find()
            .filter(race::Column::Status.eq(RaceStatus::Published))
            .filter(race::Column::Approved.eq(false))
            .order_by_asc(race::Column::RaceDate)
            .order_by_asc(race::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count items and pages for a listing query.
    pub async fn count_pages(
        &self,
        query: Select<Race>,
        page_size: u64,
    ) -> AppResult<ItemsAndPagesNumber> {
        query
            .paginate(self.db.as_ref(), page_size)
            .num_items_and_pages()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of a listing query. `page_index` is zero-based.
    pub async fn fetch_page(
        &self,
        query: Select<Race>,
        page_size: u64,
        page_index: u64,
    ) -> AppResult<Vec<race::Model>> {
        query
            .paginate(self.db.as_ref(), page_size)
            .fetch_page(page_index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new race.
    pub async fn create(&self, model: race::ActiveModel) -> AppResult<race::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a race.
    pub async fn update(&self, model: race::ActiveModel) -> AppResult<race::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a race. Its comments go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Race::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Apply a transition to every race in `ids` inside one transaction.
    ///
    /// The closure returns `None` for races it leaves untouched. Returns the
    /// number of races actually written. Any failure rolls back the whole set.
    pub async fn apply_to_many<F>(&self, ids: &[String], transition: F) -> AppResult<u64>
    where
        F: Fn(&race::Model) -> Option<race::ActiveModel>,
    {
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let races = Race::find()
            .filter(race::Column::Id.is_in(ids.to_vec()))
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut changed = 0;
        for race in &races {
            if let Some(active) = transition(race) {
                active
                    .update(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                changed += 1;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(changed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::race::{Difficulty, Distance};
    use chrono::{NaiveDate, Utc};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, Set};

    fn create_test_race(id: &str, approved: bool) -> race::Model {
        race::Model {
            id: id.to_string(),
            name: format!("Race {id}"),
            description: "A race".to_string(),
            distance: Distance::FiveK,
            custom_distance: None,
            difficulty: Difficulty::EasyPeasy,
            race_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            city: "York".to_string(),
            country: "UK".to_string(),
            latitude: None,
            longitude: None,
            registration_link: None,
            image: None,
            status: RaceStatus::Published,
            approved,
            approved_by: None,
            approved_at: None,
            created_by: "user1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_published_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<race::Model>::new()])
                .into_connection(),
        );

        let repo = RaceRepository::new(db);
        let result = repo.find_published_by_id("draft1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_count_pages() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(13))
                }]])
                .into_connection(),
        );

        let repo = RaceRepository::new(db);
        let counts = repo.count_pages(Race::find(), 6).await.unwrap();

        assert_eq!(counts.number_of_items, 13);
        assert_eq!(counts.number_of_pages, 3);
    }

    #[tokio::test]
    async fn test_apply_to_many_counts_changed_rows() {
        let r1 = create_test_race("r1", false);
        let r2 = create_test_race("r2", true);
        let r3 = create_test_race("r3", false);

        let mut r1_approved = r1.clone();
        r1_approved.approved = true;
        let mut r3_approved = r3.clone();
        r3_approved.approved = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![r1, r2, r3]])
                .append_query_results([[r1_approved]])
                .append_query_results([[r3_approved]])
                .into_connection(),
        );

        let repo = RaceRepository::new(db);
        let ids = vec!["r1".to_string(), "r2".to_string(), "r3".to_string()];
        let changed = repo
            .apply_to_many(&ids, |race| {
                if race.approved {
                    return None;
                }
                let mut active: race::ActiveModel = race.clone().into();
                active.approved = Set(true);
                Some(active)
            })
            .await
            .unwrap();

        assert_eq!(changed, 2);
    }

    #[tokio::test]
    async fn test_apply_to_many_rolls_back_on_failure() {
        let r1 = create_test_race("r1", false);
        let r2 = create_test_race("r2", false);

        let mut r1_approved = r1.clone();
        r1_approved.approved = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![r1, r2]])
                .append_query_results([[r1_approved]])
                .append_query_errors([DbErr::Custom("connection lost".to_string())])
                .into_connection(),
        );

        let repo = RaceRepository::new(Arc::clone(&db));
        let ids = vec!["r1".to_string(), "r2".to_string()];
        let result = repo
            .apply_to_many(&ids, |race| {
                let mut active: race::ActiveModel = race.clone().into();
                active.approved = Set(true);
                Some(active)
            })
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        let statements: Vec<String> = log[0]
            .statements()
            .iter()
            .map(|stmt| stmt.sql.clone())
            .collect();
        assert_eq!(statements.first().map(String::as_str), Some("BEGIN"));
        assert_eq!(statements.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!statements.iter().any(|sql| sql == "COMMIT"));
    }

    #[tokio::test]
    async fn test_apply_to_many_empty_ids() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = RaceRepository::new(db);
        let changed = repo.apply_to_many(&[], |_| None).await.unwrap();

        assert_eq!(changed, 0);
    }
}

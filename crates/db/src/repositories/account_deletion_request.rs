//! Account deletion request repository.

use std::sync::Arc;

use crate::entities::{
    AccountDeletionRequest, Comment, Race, account_deletion_request, comment, race, user,
};
use racehub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use crate::entities::account_deletion_request::DeletionRequestStatus;

/// Account deletion request repository for database operations.
#[derive(Clone)]
pub struct AccountDeletionRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountDeletionRequestRepository {
    /// Create a new account deletion request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<account_deletion_request::Model>> {
        AccountDeletionRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<account_deletion_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deletion request not found".to_string()))
    }

    /// Find the request belonging to a user.
    pub async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> AppResult<Option<account_deletion_request::Model>> {
        AccountDeletionRequest::find()
            .filter(account_deletion_request::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List requests, optionally restricted to one status, oldest first.
    pub async fn find_by_status(
        &self,
        status: Option<DeletionRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<account_deletion_request::Model>> {
        let mut query = AccountDeletionRequest::find();

        if let Some(status) = status {
            query = query.filter(account_deletion_request::Column::Status.eq(status));
        }

        query
            .order_by_asc(account_deletion_request::Column::RequestedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new request.
    pub async fn create(
        &self,
        model: account_deletion_request::ActiveModel,
    ) -> AppResult<account_deletion_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Swap a closed request for a new one.
    ///
    /// `user_id` is unique, so the old row has to go first. Both steps share
    /// one transaction.
    pub async fn replace(
        &self,
        old_id: &str,
        model: account_deletion_request::ActiveModel,
    ) -> AppResult<account_deletion_request::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        AccountDeletionRequest::delete_by_id(old_id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update a request.
    pub async fn update(
        &self,
        model: account_deletion_request::ActiveModel,
    ) -> AppResult<account_deletion_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a request.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        AccountDeletionRequest::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove the user's content, scrub the account and close the request,
    /// all in one transaction.
    pub async fn complete_with_account_removal(
        &self,
        scrubbed_user: user::ActiveModel,
        completed: account_deletion_request::ActiveModel,
        user_id: &str,
    ) -> AppResult<account_deletion_request::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Comment::delete_many()
            .filter(comment::Column::AuthorId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Comments by other users on these races cascade
        Race::delete_many()
            .filter(race::Column::CreatedBy.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        scrubbed_user
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let request = completed
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(request)
    }
}

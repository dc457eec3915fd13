//! Account deletion requests.
//!
//! Users ask for their account to be removed; staff approve or reject the
//! request and later complete it, which removes the user's races and comments
//! and deactivates the account.

use chrono::Utc;
use racehub_common::{AppError, AppResult, IdGenerator};
use racehub_db::{
    entities::{
        account_deletion_request::{self, DeletionRequestStatus, MAX_NOTE_LENGTH},
        user,
    },
    repositories::{AccountDeletionRequestRepository, UserRepository},
};
use sea_orm::Set;

use super::require_admin;
use crate::moderation::{ReviewDecision, complete_deletion, review_deletion};

fn check_note(field: &str, value: Option<&str>) -> AppResult<()> {
    if value.is_some_and(|v| v.chars().count() > MAX_NOTE_LENGTH) {
        return Err(AppError::Validation(format!(
            "{field} cannot be longer than {MAX_NOTE_LENGTH} characters"
        )));
    }
    Ok(())
}

fn normalize_note(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Account deletion service for business logic.
#[derive(Clone)]
pub struct AccountDeletionService {
    request_repo: AccountDeletionRequestRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl AccountDeletionService {
    /// Create a new account deletion service.
    #[must_use]
    pub const fn new(
        request_repo: AccountDeletionRequestRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            request_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== User actions ==========

    /// Ask for the account to be deleted.
    ///
    /// Fails with the existing request's status while one is pending or
    /// approved. A closed request is replaced.
    pub async fn request(
        &self,
        user: &user::Model,
        reason: Option<String>,
    ) -> AppResult<account_deletion_request::Model> {
        let reason = normalize_note(reason);
        check_note("Reason", reason.as_deref())?;

        let existing = self.request_repo.find_by_user_id(&user.id).await?;

        if let Some(existing) = &existing {
            if existing.status.is_active() {
                return Err(AppError::Conflict(format!(
                    "You already have a {} deletion request",
                    existing.status.as_str()
                )));
            }
        }

        let model = account_deletion_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            reason: Set(reason),
            status: Set(DeletionRequestStatus::Pending),
            requested_at: Set(Utc::now().into()),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            completed_at: Set(None),
            admin_notes: Set(None),
        };

        let request = match existing {
            Some(closed) => self.request_repo.replace(&closed.id, model).await?,
            None => self.request_repo.create(model).await?,
        };

        tracing::info!(request_id = %request.id, user_id = %user.id, "Account deletion requested");

        Ok(request)
    }

    /// The user's deletion request, if any.
    pub async fn status(
        &self,
        user: &user::Model,
    ) -> AppResult<Option<account_deletion_request::Model>> {
        self.request_repo.find_by_user_id(&user.id).await
    }

    /// Withdraw a pending request. The record is removed.
    pub async fn cancel(&self, user: &user::Model) -> AppResult<()> {
        let request = self
            .request_repo
            .find_by_user_id(&user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("No deletion request found".to_string()))?;

        if request.status != DeletionRequestStatus::Pending {
            return Err(AppError::BadRequest(format!(
                "Only pending requests can be cancelled (current status: {})",
                request.status.as_str()
            )));
        }

        self.request_repo.delete(&request.id).await?;

        tracing::info!(request_id = %request.id, user_id = %user.id, "Account deletion cancelled");

        Ok(())
    }

    // ========== Staff actions ==========

    /// List requests, optionally by status.
    pub async fn list(
        &self,
        admin: &user::Model,
        status: Option<DeletionRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<account_deletion_request::Model>> {
        require_admin(admin)?;
        self.request_repo.find_by_status(status, limit, offset).await
    }

    /// Approve a pending request.
    pub async fn approve(
        &self,
        admin: &user::Model,
        request_id: &str,
        notes: Option<String>,
    ) -> AppResult<account_deletion_request::Model> {
        self.review(admin, request_id, ReviewDecision::Approve, notes)
            .await
    }

    /// Reject a pending request.
    pub async fn reject(
        &self,
        admin: &user::Model,
        request_id: &str,
        notes: Option<String>,
    ) -> AppResult<account_deletion_request::Model> {
        self.review(admin, request_id, ReviewDecision::Reject, notes)
            .await
    }

    async fn review(
        &self,
        admin: &user::Model,
        request_id: &str,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> AppResult<account_deletion_request::Model> {
        require_admin(admin)?;

        let notes = normalize_note(notes);
        check_note("Admin notes", notes.as_deref())?;

        let request = self.request_repo.get_by_id(request_id).await?;
        let model = review_deletion(&request, decision, &admin.id, notes, Utc::now().into())?;
        let request = self.request_repo.update(model).await?;

        tracing::info!(
            request_id = %request.id,
            user_id = %request.user_id,
            admin_id = %admin.id,
            status = request.status.as_str(),
            "Account deletion reviewed"
        );

        Ok(request)
    }

    /// Remove the account behind an approved request and close it.
    pub async fn complete(
        &self,
        admin: &user::Model,
        request_id: &str,
    ) -> AppResult<account_deletion_request::Model> {
        require_admin(admin)?;

        let request = self.request_repo.get_by_id(request_id).await?;
        let completed = complete_deletion(&request, Utc::now().into())?;

        let target = self.user_repo.get_by_id(&request.user_id).await?;
        let placeholder = format!("deleted-{}", target.id);

        let mut scrubbed: user::ActiveModel = target.into();
        scrubbed.username = Set(placeholder.clone());
        scrubbed.username_lower = Set(placeholder);
        scrubbed.password_hash = Set(None);
        scrubbed.token = Set(None);
        scrubbed.is_admin = Set(false);
        scrubbed.is_moderator = Set(false);
        scrubbed.is_active = Set(false);
        scrubbed.updated_at = Set(Some(Utc::now().into()));

        let request = self
            .request_repo
            .complete_with_account_removal(scrubbed, completed, &request.user_id)
            .await?;

        tracing::info!(
            request_id = %request.id,
            user_id = %request.user_id,
            admin_id = %admin.id,
            "Account deletion completed"
        );

        Ok(request)
    }
}

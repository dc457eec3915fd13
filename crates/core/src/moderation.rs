//! Moderation state transitions.
//!
//! Each function takes a snapshot of a record and returns the active model to
//! write, or `None`/an error when the transition does not apply.

use racehub_common::{AppError, AppResult};
use racehub_db::entities::{
    account_deletion_request::{self, DeletionRequestStatus},
    race,
};
use sea_orm::{ActiveValue::Set, prelude::DateTimeWithTimeZone};

/// Approve a race.
///
/// Returns `None` when the race is already approved so the original approver
/// and timestamp survive repeat calls.
#[must_use]
pub fn approve_race(
    race: &race::Model,
    admin_id: &str,
    now: DateTimeWithTimeZone,
) -> Option<race::ActiveModel> {
    if race.approved {
        return None;
    }

    let mut active: race::ActiveModel = race.clone().into();
    active.approved = Set(true);
    active.approved_by = Set(Some(admin_id.to_string()));
    active.approved_at = Set(Some(now));
    Some(active)
}

/// Withdraw approval from a race.
///
/// Returns `None` only when the race is already unapproved with no approval
/// stamp left to clear.
#[must_use]
pub fn unapprove_race(race: &race::Model) -> Option<race::ActiveModel> {
    if !race.approved && race.approved_by.is_none() && race.approved_at.is_none() {
        return None;
    }

    let mut active: race::ActiveModel = race.clone().into();
    active.approved = Set(false);
    active.approved_by = Set(None);
    active.approved_at = Set(None);
    Some(active)
}

/// Admin decision on a pending deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Approve or reject a deletion request. Only pending requests can be reviewed.
pub fn review_deletion(
    request: &account_deletion_request::Model,
    decision: ReviewDecision,
    admin_id: &str,
    notes: Option<String>,
    now: DateTimeWithTimeZone,
) -> AppResult<account_deletion_request::ActiveModel> {
    if request.status != DeletionRequestStatus::Pending {
        return Err(AppError::BadRequest(format!(
            "Deletion request is already {}",
            request.status.as_str()
        )));
    }

    let status = match decision {
        ReviewDecision::Approve => DeletionRequestStatus::Approved,
        ReviewDecision::Reject => DeletionRequestStatus::Rejected,
    };

    let mut active: account_deletion_request::ActiveModel = request.clone().into();
    active.status = Set(status);
    active.reviewed_by = Set(Some(admin_id.to_string()));
    active.reviewed_at = Set(Some(now));
    active.admin_notes = Set(notes);
    Ok(active)
}

/// Mark a deletion request completed. Only approved requests can complete.
pub fn complete_deletion(
    request: &account_deletion_request::Model,
    now: DateTimeWithTimeZone,
) -> AppResult<account_deletion_request::ActiveModel> {
    if request.status != DeletionRequestStatus::Approved {
        return Err(AppError::BadRequest(format!(
            "Only approved deletion requests can be completed (current status: {})",
            request.status.as_str()
        )));
    }

    let mut active: account_deletion_request::ActiveModel = request.clone().into();
    active.status = Set(DeletionRequestStatus::Completed);
    active.completed_at = Set(Some(now));
    Ok(active)
}

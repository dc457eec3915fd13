//! Business logic services.

#![allow(missing_docs)]

pub mod account_deletion;
pub mod comment;
pub mod race;
pub mod user;

pub use account_deletion::AccountDeletionService;
pub use comment::CommentService;
pub use race::{
    CreateRaceInput, CreatedRace, PageInfo, RaceDetail, RacePage, RaceService, UpdateRaceInput,
};
pub use user::{CreateUserInput, UserService};

use racehub_common::{AppError, AppResult};
use racehub_db::entities::user as user_entity;

use crate::policy::has_admin_capability;

/// Reject callers without staff capability.
fn require_admin(user: &user_entity::Model) -> AppResult<()> {
    if !has_admin_capability(user) {
        return Err(AppError::Forbidden(
            "This action requires administrator privileges".to_string(),
        ));
    }
    Ok(())
}

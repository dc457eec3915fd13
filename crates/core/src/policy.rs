//! Who may see which races.
//!
//! Everything here works on already-loaded records and builds queries
//! without running them, so it can be tested without a database.

use racehub_common::{AppError, AppResult};
use racehub_db::entities::{
    Race,
    race::{self, Difficulty, RaceStatus},
    user,
};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};

/// Sentinel difficulty value that disables the filter.
pub const ALL_DIFFICULTIES: &str = "ALL";

/// The party looking at races.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// Not signed in.
    Anonymous,
    /// A signed-in user.
    User {
        /// User ID.
        id: String,
        /// Whether the user holds admin capability.
        admin: bool,
    },
}

impl Viewer {
    /// Build a viewer from the optional signed-in user.
    #[must_use]
    pub fn from_user(user: Option<&user::Model>) -> Self {
        user.map_or(Self::Anonymous, |u| Self::User {
            id: u.id.clone(),
            admin: has_admin_capability(u),
        })
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::User { admin: true, .. })
    }

    /// The viewer's user ID, if signed in.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(id),
        }
    }
}

/// Admins and moderators share the staff capability.
#[must_use]
pub const fn has_admin_capability(user: &user::Model) -> bool {
    user.is_admin || user.is_moderator
}

/// Whether `viewer` may see `race`.
///
/// Published and approved races are public. Anything else is visible only to
/// staff and to the race's creator.
#[must_use]
pub fn is_visible(race: &race::Model, viewer: &Viewer) -> bool {
    if race.is_visible_to_public() {
        return true;
    }

    match viewer {
        Viewer::Anonymous => false,
        Viewer::User { admin: true, .. } => true,
        Viewer::User { id, .. } => race.created_by == *id,
    }
}

/// Whether `viewer` may edit or delete `race`.
#[must_use]
pub fn can_modify(race: &race::Model, viewer: &Viewer) -> bool {
    match viewer {
        Viewer::Anonymous => false,
        Viewer::User { admin: true, .. } => true,
        Viewer::User { id, .. } => race.created_by == *id,
    }
}

/// The set of races a viewer may see in aggregate views.
#[must_use]
pub fn listing_scope(viewer: &Viewer) -> Condition {
    let published = Condition::all().add(race::Column::Status.eq(RaceStatus::Published));

    match viewer {
        Viewer::User { admin: true, .. } => published,
        Viewer::User { id, .. } => published.add(
            Condition::any()
                .add(race::Column::Approved.eq(true))
                .add(race::Column::CreatedBy.eq(id.as_str())),
        ),
        Viewer::Anonymous => published.add(race::Column::Approved.eq(true)),
    }
}

/// Listing query: scope, optional difficulty filter, earliest race first.
#[must_use]
pub fn listing_query(viewer: &Viewer, difficulty: Option<Difficulty>) -> Select<Race> {
    let mut query = Race::find().filter(listing_scope(viewer));

    if let Some(difficulty) = difficulty {
        query = query.filter(race::Column::Difficulty.eq(difficulty));
    }

    query
        .order_by_asc(race::Column::RaceDate)
        .order_by_asc(race::Column::Id)
}

/// A user's own races, most recently created first.
#[must_use]
pub fn my_races_query(user_id: &str) -> Select<Race> {
    Race::find()
        .filter(race::Column::CreatedBy.eq(user_id))
        .order_by_desc(race::Column::CreatedAt)
        .order_by_desc(race::Column::Id)
}

/// Parse the difficulty query parameter.
///
/// Absent, empty and `ALL` disable the filter.
pub fn parse_difficulty_filter(raw: Option<&str>) -> AppResult<Option<Difficulty>> {
    match raw.map(str::trim) {
        None | Some("") | Some(ALL_DIFFICULTIES) => Ok(None),
        Some(code) => Difficulty::from_code(code)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown difficulty: {code}"))),
    }
}

/// Parse the page query parameter. Anything unusable means page 1.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1)
}

/// Clamp a requested page into `1..=num_pages`.
///
/// An empty listing still has one (empty) page.
#[must_use]
pub fn clamp_page(requested: i64, num_pages: u64) -> u64 {
    let last = num_pages.max(1);
    if requested < 1 {
        1
    } else {
        (requested as u64).min(last)
    }
}

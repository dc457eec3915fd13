//! Comment entity.

use chrono::{Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum comment body length in characters.
pub const MAX_BODY_LENGTH: usize = 1000;

const SHORT_BODY_LENGTH: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub race_id: String,

    #[sea_orm(indexed)]
    pub author_id: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub created_at: DateTimeWithTimeZone,

    /// Hidden by a moderator when false
    #[sea_orm(default_value = true)]
    pub approved: bool,
}

impl Model {
    /// Posted within the last 24 hours.
    #[must_use]
    pub fn is_recent(&self) -> bool {
        Utc::now().signed_duration_since(self.created_at) < Duration::hours(24)
    }

    /// First 100 characters of the body, with an ellipsis when truncated.
    #[must_use]
    pub fn short_body(&self) -> String {
        if self.body.chars().count() > SHORT_BODY_LENGTH {
            let head: String = self.body.chars().take(SHORT_BODY_LENGTH).collect();
            format!("{head}...")
        } else {
            self.body.clone()
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::race::Entity",
        from = "Column::RaceId",
        to = "super::race::Column::Id",
        on_delete = "Cascade"
    )]
    Race,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::race::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Race.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

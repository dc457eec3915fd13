//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    /// Argon2 PHC string. Cleared when the account is scrubbed.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Session token
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(default_value = false)]
    pub is_moderator: bool,

    /// False once the account has been removed through a deletion request.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::race::Entity")]
    Races,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_one = "super::account_deletion_request::Entity")]
    DeletionRequest,
}

impl Related<super::race::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Races.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::account_deletion_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeletionRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Account deletion request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of an account deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DeletionRequestStatus {
    /// Waiting for an administrator.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved, account removal outstanding.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected by an administrator.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Account data removed.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl DeletionRequestStatus {
    /// Pending and Approved requests block a new request.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

/// Maximum length of the user's reason and of admin notes.
pub const MAX_NOTE_LENGTH: usize = 500;

/// A user's request to have their account removed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_deletion_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// One request per user, whatever its status.
    #[sea_orm(unique)]
    pub user_id: String,

    #[sea_orm(nullable)]
    pub reason: Option<String>,

    pub status: DeletionRequestStatus,

    pub requested_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub admin_notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

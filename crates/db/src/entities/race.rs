//! Race entity.

use chrono::{NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Distance category of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distance {
    #[sea_orm(string_value = "5K")]
    #[serde(rename = "5K")]
    FiveK,
    #[sea_orm(string_value = "HALF")]
    Half,
    #[sea_orm(string_value = "FULL")]
    Full,
    #[sea_orm(string_value = "ULTRA")]
    Ultra,
    /// Free-text distance carried in `custom_distance`.
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl Distance {
    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FiveK => "5K (3.1 miles)",
            Self::Half => "Half Marathon (13.1 miles)",
            Self::Full => "Full Marathon (26.2 miles)",
            Self::Ultra => "Ultra Marathon (50K+)",
            Self::Other => "Other Distance",
        }
    }
}

/// Difficulty category of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    #[sea_orm(string_value = "EASY_PEASY")]
    EasyPeasy,
    #[sea_orm(string_value = "ADULTS_ONLY")]
    AdultsOnly,
    #[sea_orm(string_value = "CRAZY_TOUGH")]
    CrazyTough,
    #[sea_orm(string_value = "EXTREME_LAUGH")]
    ExtremeLaugh,
}

impl Difficulty {
    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EasyPeasy => "Easy-peasy",
            Self::AdultsOnly => "Adults Only",
            Self::CrazyTough => "Crazy Tough",
            Self::ExtremeLaugh => "Extreme Laugh",
        }
    }

    /// Parse the stored code (`EASY_PEASY`, ...).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "EASY_PEASY" => Some(Self::EasyPeasy),
            "ADULTS_ONLY" => Some(Self::AdultsOnly),
            "CRAZY_TOUGH" => Some(Self::CrazyTough),
            "EXTREME_LAUGH" => Some(Self::ExtremeLaugh),
            _ => None,
        }
    }
}

/// Lifecycle status. Independent of moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    #[sea_orm(num_value = 0)]
    Draft,
    #[sea_orm(num_value = 1)]
    Published,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub distance: Distance,

    /// Only meaningful when `distance` is `Other`
    #[sea_orm(nullable)]
    pub custom_distance: Option<String>,

    pub difficulty: Difficulty,

    #[sea_orm(indexed)]
    pub race_date: Date,

    #[sea_orm(indexed)]
    pub city: String,

    pub country: String,

    #[sea_orm(nullable)]
    pub latitude: Option<f64>,

    #[sea_orm(nullable)]
    pub longitude: Option<f64>,

    #[sea_orm(nullable)]
    pub registration_link: Option<String>,

    /// Hosted image public ID
    #[sea_orm(nullable)]
    pub image: Option<String>,

    #[sea_orm(indexed)]
    pub status: RaceStatus,

    #[sea_orm(default_value = false)]
    pub approved: bool,

    /// Set together with `approved_at`
    #[sea_orm(nullable)]
    pub approved_by: Option<String>,

    #[sea_orm(nullable)]
    pub approved_at: Option<DateTimeWithTimeZone>,

    pub created_by: String,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == RaceStatus::Published
    }

    /// Published and approved: anyone may see it.
    #[must_use]
    pub fn is_visible_to_public(&self) -> bool {
        self.is_published() && self.approved
    }

    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Days from `today` until the race. Negative once the race is over.
    #[must_use]
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.race_date - today).num_days()
    }

    #[must_use]
    pub fn days_until_race(&self) -> i64 {
        self.days_until(Utc::now().date_naive())
    }

    /// The custom distance for `Other`, the category label otherwise.
    #[must_use]
    pub fn distance_label(&self) -> String {
        match (self.distance, self.custom_distance.as_deref()) {
            (Distance::Other, Some(custom)) if !custom.trim().is_empty() => custom.to_string(),
            (distance, _) => distance.label().to_string(),
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.race_date.format("%d/%m/%Y"))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApprovedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Approver,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Create race table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Race::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Race::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Race::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Race::Description).text().not_null())
                    .col(
                        ColumnDef::new(Race::Distance)
                            .string_len(10)
                            .not_null()
                            .default("OTHER"),
                    )
                    .col(ColumnDef::new(Race::CustomDistance).string_len(50))
                    .col(
                        ColumnDef::new(Race::Difficulty)
                            .string_len(20)
                            .not_null()
                            .default("EASY_PEASY"),
                    )
                    .col(ColumnDef::new(Race::RaceDate).date().not_null())
                    .col(ColumnDef::new(Race::City).string_len(100).not_null())
                    .col(ColumnDef::new(Race::Country).string_len(50).not_null().default("UK"))
                    .col(ColumnDef::new(Race::Latitude).double())
                    .col(ColumnDef::new(Race::Longitude).double())
                    .col(ColumnDef::new(Race::RegistrationLink).string_len(1024))
                    .col(ColumnDef::new(Race::Image).string_len(512))
                    .col(ColumnDef::new(Race::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(Race::Approved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Race::ApprovedBy).string_len(32))
                    .col(ColumnDef::new(Race::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Race::CreatedBy).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Race::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_race_created_by")
                            .from(Race::Table, Race::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_race_approved_by")
                            .from(Race::Table, Race::ApprovedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: race_date (listing order)
        manager
            .create_index(
                Index::create()
                    .name("idx_race_race_date")
                    .table(Race::Table)
                    .col(Race::RaceDate)
                    .to_owned(),
            )
            .await?;

        // Index: city
        manager
            .create_index(
                Index::create()
                    .name("idx_race_city")
                    .table(Race::Table)
                    .col(Race::City)
                    .to_owned(),
            )
            .await?;

        // Index: status
        manager
            .create_index(
                Index::create()
                    .name("idx_race_status")
                    .table(Race::Table)
                    .col(Race::Status)
                    .to_owned(),
            )
            .await?;

        // Index: created_by (my races)
        manager
            .create_index(
                Index::create()
                    .name("idx_race_created_by")
                    .table(Race::Table)
                    .col(Race::CreatedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Race::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Race {
    Table,
    Id,
    Name,
    Description,
    Distance,
    CustomDistance,
    Difficulty,
    RaceDate,
    City,
    Country,
    Latitude,
    Longitude,
    RegistrationLink,
    Image,
    Status,
    Approved,
    ApprovedBy,
    ApprovedAt,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

//! Create account deletion request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccountDeletionRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountDeletionRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountDeletionRequest::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountDeletionRequest::Reason).string_len(500))
                    .col(
                        ColumnDef::new(AccountDeletionRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(AccountDeletionRequest::RequestedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AccountDeletionRequest::ReviewedBy).string_len(32))
                    .col(
                        ColumnDef::new(AccountDeletionRequest::ReviewedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(AccountDeletionRequest::CompletedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(AccountDeletionRequest::AdminNotes).string_len(500))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_deletion_request_user_id")
                            .from(AccountDeletionRequest::Table, AccountDeletionRequest::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_deletion_request_reviewed_by")
                            .from(
                                AccountDeletionRequest::Table,
                                AccountDeletionRequest::ReviewedBy,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: user_id (one request per user regardless of status)
        manager
            .create_index(
                Index::create()
                    .name("idx_account_deletion_request_user_id")
                    .table(AccountDeletionRequest::Table)
                    .col(AccountDeletionRequest::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status + requested_at (admin queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_account_deletion_request_status")
                    .table(AccountDeletionRequest::Table)
                    .col(AccountDeletionRequest::Status)
                    .col(AccountDeletionRequest::RequestedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(AccountDeletionRequest::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum AccountDeletionRequest {
    Table,
    Id,
    UserId,
    Reason,
    Status,
    RequestedAt,
    ReviewedBy,
    ReviewedAt,
    CompletedAt,
    AdminNotes,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

//! Create commits table.
//!
//! The unique (repo, sha) index is what deduplicates concurrent push ingestion.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Commits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Commits::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Commits::Repo).string().not_null())
                    .col(ColumnDef::new(Commits::Sha).string().not_null())
                    .col(
                        ColumnDef::new(Commits::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Commits::Status)
                            .string_len(20)
                            .not_null()
                            .default("unchecked"),
                    )
                    .col(ColumnDef::new(Commits::Warnings).json())
                    .col(ColumnDef::new(Commits::ClaimedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Commits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Commits::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commits_repo_sha")
                    .table(Commits::Table)
                    .col(Commits::Repo)
                    .col(Commits::Sha)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Latest-commit lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_commits_repo_date")
                    .table(Commits::Table)
                    .col(Commits::Repo)
                    .col(Commits::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Commits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Commits {
    Table,
    Id,
    Repo,
    Sha,
    Date,
    Status,
    Warnings,
    ClaimedAt,
    CreatedAt,
    UpdatedAt,
}

//! SeaORM database migrations.
//!
//! Migrations use the schema builder so the same set runs on PostgreSQL and SQLite.

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_repositories;
mod m20261019_000002_create_commits;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_repositories::Migration),
            Box::new(m20261019_000002_create_commits::Migration),
        ]
    }
}

//! Commit entity for SeaORM.
//!
//! Commits reference their repository by full name only; a commit row may
//! exist before (or without) a repository subscription record.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "commits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub repo: String,
    pub sha: String,
    pub date: DateTimeUtc,
    /// unchecked, checking, success, failed
    pub status: String,
    /// JSON array of warning strings, NULL until checked
    #[sea_orm(column_type = "Json", nullable)]
    pub warnings: Option<JsonValue>,
    /// Set while a worker holds the check claim
    pub claimed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

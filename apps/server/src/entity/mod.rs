//! SeaORM entity definitions.

pub mod commit;
pub mod repository;

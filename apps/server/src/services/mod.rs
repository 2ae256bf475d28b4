//! Business logic services.

pub mod flint;
pub mod ingestion;
pub mod repositories;
pub mod signature;

pub use flint::{CheckInvoker, HttpCheckInvoker};
pub use ingestion::Ingestion;

//! Flint tracker E2E test suite.
//!
//! Runs the stores, the ingestion workflow and the HTTP layer against an
//! in-memory SQLite database, with a scripted check invoker standing in for
//! the flint service (and a mock HTTP flint service for the real client).
//!
//! Run with: cargo test --test flint_e2e

mod mock_flint_service;

mod test_api;
mod test_http_check;
mod test_repositories;

//! Flint tracker library.
//!
//! Tracks repositories and their commits, recording for each commit whether
//! the flint static-analysis check passed.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod repositories;
pub mod webhook;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use repositories::configure_routes as configure_repository_routes;
pub use webhook::configure_routes as configure_webhook_routes;

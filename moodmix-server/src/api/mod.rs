//! HTTP API handlers for moodmix-server

pub mod classify;
pub mod health;

pub use classify::classify_routes;
pub use health::health_routes;

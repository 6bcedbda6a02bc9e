//! HTTP handlers, one module per resource.

pub mod auth;
pub mod comment;
pub mod health;
pub mod menu_item;
pub mod review;
pub mod store;

pub use health::{HealthResponse, health_check};

//! Menu Reviews - restaurant menu review backend
//!
//! # Modules
//!
//! - [`config`] - YAML config with environment overrides
//! - [`logging`] - tracing subscriber and rolling file output
//! - [`auth`] - JWT tokens, Argon2 passwords, bearer middleware, ownership
//! - [`repository`] - persistence contracts (Postgres and in-memory)
//! - [`services`] - stores, menu items, reviews, likes, comments, uploads
//! - [`storage`] - object storage for review images (Cloudinary)
//! - [`gateway`] - axum router, handlers and OpenAPI docs
//! - [`seed`] - demo data

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;
pub mod storage;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use error::{ServiceError, ServiceResult};
pub use gateway::{build_router, run_server, state::AppState};
pub use repository::Repositories;

//! Persistence contracts.
//!
//! Each resource has an `async_trait` repository with a Postgres
//! implementation ([`pg`]) and an in-memory one ([`memory`]). Services only
//! see `Arc<dyn ...Repository>`, bundled together in [`Repositories`].
//!
//! Uniqueness (user email, store name, one like per user and review) and
//! referential integrity are enforced by the storage layer and surface as
//! [`RepoError::UniqueViolation`] / [`RepoError::ForeignKeyViolation`].

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use utoipa::IntoParams;

use crate::models::{
    MenuItem, NewUser, Review, ReviewComment, ReviewImage, ReviewLike, Store, User,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("check constraint violated: {0}")]
    CheckViolation(String),
    #[error("database operation timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) => {
                let constraint = db.constraint().unwrap_or_default().to_string();
                if db.is_unique_violation() {
                    return Self::UniqueViolation(constraint);
                }
                if db.is_foreign_key_violation() {
                    return Self::ForeignKeyViolation(constraint);
                }
                if db.is_check_violation() {
                    return Self::CheckViolation(constraint);
                }
                // query_canceled, raised by statement_timeout
                if db.code().as_deref() == Some("57014") {
                    return Self::Timeout;
                }
                Self::Database(e)
            }
            sqlx::Error::PoolTimedOut => Self::Timeout,
            _ => Self::Database(e),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub store_id: i64,
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct MenuItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub menu_item_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub title: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReviewImage {
    pub review_id: i64,
    pub image_url: String,
    pub image_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub review_id: i64,
    pub user_id: i64,
    pub comment: String,
}

/// Review list filters; all present filters must match.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewFilter {
    pub menu_item_id: Option<i64>,
    pub store_id: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentFilter {
    pub review_id: Option<i64>,
    pub user_id: Option<i64>,
}

// ============================================================================
// Contracts
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new: NewUser) -> RepoResult<User>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn count(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn create(&self, new: NewStore) -> RepoResult<Store>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Store>>;
    /// Newest first
    async fn list(&self) -> RepoResult<Vec<Store>>;
    async fn update(&self, id: i64, changes: StoreChanges) -> RepoResult<Option<Store>>;
    /// Fails with `ForeignKeyViolation` while menu items reference the store.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait MenuItemRepository: Send + Sync {
    async fn create(&self, new: NewMenuItem) -> RepoResult<MenuItem>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>>;
    /// Newest first
    async fn list(&self) -> RepoResult<Vec<MenuItem>>;
    /// Ordered by id ascending
    async fn list_by_store(&self, store_id: i64) -> RepoResult<Vec<MenuItem>>;
    async fn update(&self, id: i64, changes: MenuItemChanges) -> RepoResult<Option<MenuItem>>;
    /// Fails with `ForeignKeyViolation` while reviews (soft-deleted included)
    /// reference the item.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

/// Soft-deleted reviews are invisible to every read and write here.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, new: NewReview) -> RepoResult<Review>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Review>>;
    /// Newest first
    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>>;
    /// Reviews liked by `user_id`, newest review first
    async fn list_liked_by(&self, user_id: i64) -> RepoResult<Vec<Review>>;
    async fn update(&self, id: i64, changes: ReviewChanges) -> RepoResult<Option<Review>>;
    async fn soft_delete(&self, id: i64) -> RepoResult<bool>;
    async fn add_image(&self, new: NewReviewImage) -> RepoResult<ReviewImage>;
    /// Ordered by `image_order`, then id
    async fn list_images(&self, review_id: i64) -> RepoResult<Vec<ReviewImage>>;
    /// Highest `image_order` in use, if any images exist
    async fn max_image_order(&self, review_id: i64) -> RepoResult<Option<i32>>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Insert-or-get. The flag is `true` when a new like was created.
    async fn like(&self, review_id: i64, user_id: i64) -> RepoResult<(ReviewLike, bool)>;
    /// `true` when a like was removed
    async fn unlike(&self, review_id: i64, user_id: i64) -> RepoResult<bool>;
    /// Newest first
    async fn list_by_review(&self, review_id: i64) -> RepoResult<Vec<ReviewLike>>;
    async fn count_by_review(&self, review_id: i64) -> RepoResult<i64>;
}

/// Soft-deleted comments are invisible to every read and write here.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, new: NewComment) -> RepoResult<ReviewComment>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<ReviewComment>>;
    /// Newest first
    async fn list(&self, filter: &CommentFilter) -> RepoResult<Vec<ReviewComment>>;
    async fn update(&self, id: i64, comment: String) -> RepoResult<Option<ReviewComment>>;
    async fn soft_delete(&self, id: i64) -> RepoResult<bool>;
}

/// One handle per resource, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub menu_items: Arc<dyn MenuItemRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(pg::PgUserRepository::new(pool.clone())),
            stores: Arc::new(pg::PgStoreRepository::new(pool.clone())),
            menu_items: Arc::new(pg::PgMenuItemRepository::new(pool.clone())),
            reviews: Arc::new(pg::PgReviewRepository::new(pool.clone())),
            likes: Arc::new(pg::PgLikeRepository::new(pool.clone())),
            comments: Arc::new(pg::PgCommentRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(memory::MemoryStore::new()))
    }

    /// Build from an existing store, so callers can keep a handle to it.
    pub fn from_memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            stores: store.clone(),
            menu_items: store.clone(),
            reviews: store.clone(),
            likes: store.clone(),
            comments: store,
        }
    }
}

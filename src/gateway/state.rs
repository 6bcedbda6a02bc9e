use std::sync::Arc;

use crate::auth::{AuthService, PasswordHashing, TokenService};
use crate::db::Database;
use crate::repository::Repositories;
use crate::services::{
    CommentService, LikeService, MenuItemService, ReviewService, StoreService, UploadService,
};
use crate::storage::ObjectStorage;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub stores: Arc<StoreService>,
    pub menu_items: Arc<MenuItemService>,
    pub reviews: Arc<ReviewService>,
    pub likes: Arc<LikeService>,
    pub comments: Arc<CommentService>,
    /// `None` when no object storage is configured
    pub uploads: Option<Arc<UploadService>>,
    /// `None` when running on in-memory repositories
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        tokens: Arc<TokenService>,
        hashing: Arc<PasswordHashing>,
        storage: Option<(Arc<dyn ObjectStorage>, String)>,
        pg_db: Option<Arc<Database>>,
    ) -> Self {
        let reviews = Arc::new(ReviewService::new(
            repos.reviews.clone(),
            repos.menu_items.clone(),
            repos.likes.clone(),
        ));
        let uploads = storage.map(|(storage, folder)| {
            Arc::new(UploadService::new(storage, reviews.clone(), folder))
        });

        Self {
            auth: Arc::new(AuthService::new(
                repos.users.clone(),
                tokens.clone(),
                hashing,
            )),
            tokens,
            stores: Arc::new(StoreService::new(repos.stores.clone())),
            menu_items: Arc::new(MenuItemService::new(
                repos.menu_items.clone(),
                repos.stores.clone(),
            )),
            reviews,
            likes: Arc::new(LikeService::new(repos.likes.clone(), repos.reviews.clone())),
            comments: Arc::new(CommentService::new(repos.comments, repos.reviews)),
            uploads,
            pg_db,
        }
    }
}

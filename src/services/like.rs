use std::sync::Arc;

use crate::auth::AuthUser;
use crate::error::{ServiceError, ServiceResult};
use crate::models::ReviewLike;
use crate::repository::{LikeRepository, RepoError, ReviewRepository};

/// Likes are idempotent in both directions: liking twice returns the
/// existing like, unliking something never liked succeeds.
pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl LikeService {
    pub fn new(likes: Arc<dyn LikeRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { likes, reviews }
    }

    async fn require_review(&self, review_id: i64) -> ServiceResult<()> {
        match self.reviews.get_by_id(review_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound("review")),
        }
    }

    /// Returns the like and whether it was newly created.
    pub async fn like(&self, user: &AuthUser, review_id: i64) -> ServiceResult<(ReviewLike, bool)> {
        self.require_review(review_id).await?;
        let (like, created) = self
            .likes
            .like(review_id, user.user_id)
            .await
            .map_err(|e| match e {
                RepoError::ForeignKeyViolation(_) => ServiceError::NotFound("review"),
                other => other.into(),
            })?;
        if created {
            tracing::debug!(review_id, user_id = user.user_id, "review liked");
        }
        Ok((like, created))
    }

    pub async fn unlike(&self, user: &AuthUser, review_id: i64) -> ServiceResult<()> {
        self.require_review(review_id).await?;
        if self.likes.unlike(review_id, user.user_id).await? {
            tracing::debug!(review_id, user_id = user.user_id, "review unliked");
        }
        Ok(())
    }

    pub async fn list(&self, review_id: i64) -> ServiceResult<Vec<ReviewLike>> {
        self.require_review(review_id).await?;
        Ok(self.likes.list_by_review(review_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::repository::memory::MemoryStore;
    use crate::repository::{
        MenuItemRepository, NewMenuItem, NewReview, NewStore, StoreRepository, UserRepository,
    };

    async fn setup() -> (LikeService, AuthUser, i64) {
        let repo = Arc::new(MemoryStore::new());
        let user = UserRepository::create(
            repo.as_ref(),
            NewUser {
                email: "alice@example.com".into(),
                name: "Alice".into(),
                password_hash: "x".into(),
            },
        )
        .await
        .unwrap();
        let store = StoreRepository::create(
            repo.as_ref(),
            NewStore {
                name: "S".into(),
                address: String::new(),
                phone: String::new(),
            },
        )
        .await
        .unwrap();
        let item = MenuItemRepository::create(
            repo.as_ref(),
            NewMenuItem {
                store_id: store.id,
                name: "I".into(),
                description: String::new(),
                price: None,
            },
        )
        .await
        .unwrap();
        let review = ReviewRepository::create(
            repo.as_ref(),
            NewReview {
                menu_item_id: item.id,
                user_id: user.id,
                rating: 5,
                title: String::new(),
                comment: String::new(),
            },
        )
        .await
        .unwrap();

        let auth = AuthUser {
            user_id: user.id,
            email: user.email,
        };
        (LikeService::new(repo.clone(), repo), auth, review.id)
    }

    #[tokio::test]
    async fn test_like_twice_returns_existing() {
        let (svc, user, review_id) = setup().await;
        let (first, created) = svc.like(&user, review_id).await.unwrap();
        assert!(created);
        let (second, created) = svc.like(&user, review_id).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(svc.list(review_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unlike_absent_succeeds() {
        let (svc, user, review_id) = setup().await;
        svc.unlike(&user, review_id).await.unwrap();
        svc.like(&user, review_id).await.unwrap();
        svc.unlike(&user, review_id).await.unwrap();
        svc.unlike(&user, review_id).await.unwrap();
        assert!(svc.list(review_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_review() {
        let (svc, user, _) = setup().await;
        assert!(matches!(
            svc.like(&user, 9999).await,
            Err(ServiceError::NotFound("review"))
        ));
    }
}

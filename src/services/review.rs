use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{AuthUser, ensure_owner};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Review, ReviewDetail, ReviewImage};
use crate::repository::{
    LikeRepository, MenuItemRepository, NewReview, NewReviewImage, RepoError, ReviewChanges,
    ReviewFilter, ReviewRepository,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    pub menu_item_id: i64,
    #[schema(minimum = 1, maximum = 5, example = 4)]
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i32,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewRequest {
    #[schema(minimum = 1, maximum = 5)]
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddReviewImageRequest {
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/sample.jpg")]
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub image_order: i32,
}

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        menu_items: Arc<dyn MenuItemRepository>,
        likes: Arc<dyn LikeRepository>,
    ) -> Self {
        Self {
            reviews,
            menu_items,
            likes,
        }
    }

    pub async fn create(&self, user: &AuthUser, req: CreateReviewRequest) -> ServiceResult<Review> {
        req.validate()?;

        if self.menu_items.get_by_id(req.menu_item_id).await?.is_none() {
            return Err(ServiceError::NotFound("menu item"));
        }

        let review = self
            .reviews
            .create(NewReview {
                menu_item_id: req.menu_item_id,
                user_id: user.user_id,
                rating: req.rating,
                title: req.title,
                comment: req.comment,
            })
            .await
            .map_err(|e| match e {
                RepoError::ForeignKeyViolation(_) => ServiceError::NotFound("menu item"),
                other => other.into(),
            })?;
        tracing::info!(review_id = review.id, user_id = user.user_id, "review created");
        Ok(review)
    }

    /// Review with ordered images and like count.
    pub async fn get(&self, id: i64) -> ServiceResult<ReviewDetail> {
        let review = self
            .reviews
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("review"))?;
        let images = self.reviews.list_images(id).await?;
        let like_count = self.likes.count_by_review(id).await?;
        Ok(ReviewDetail {
            review,
            images,
            like_count,
        })
    }

    pub async fn list(&self, filter: &ReviewFilter) -> ServiceResult<Vec<Review>> {
        Ok(self.reviews.list(filter).await?)
    }

    pub async fn list_liked(&self, user: &AuthUser) -> ServiceResult<Vec<Review>> {
        Ok(self.reviews.list_liked_by(user.user_id).await?)
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        id: i64,
        req: UpdateReviewRequest,
    ) -> ServiceResult<Review> {
        self.authorize(user, id).await?;
        req.validate()?;

        self.reviews
            .update(
                id,
                ReviewChanges {
                    rating: req.rating,
                    title: req.title,
                    comment: req.comment,
                },
            )
            .await?
            .ok_or(ServiceError::NotFound("review"))
    }

    /// Soft delete; the review disappears from every read afterwards.
    pub async fn delete(&self, user: &AuthUser, id: i64) -> ServiceResult<()> {
        self.authorize(user, id).await?;
        if !self.reviews.soft_delete(id).await? {
            return Err(ServiceError::NotFound("review"));
        }
        tracing::info!(review_id = id, user_id = user.user_id, "review deleted");
        Ok(())
    }

    pub async fn add_image(
        &self,
        user: &AuthUser,
        id: i64,
        req: AddReviewImageRequest,
    ) -> ServiceResult<ReviewImage> {
        self.authorize(user, id).await?;
        req.validate()?;
        self.persist_image(id, req.image_url, req.image_order).await
    }

    pub async fn list_images(&self, id: i64) -> ServiceResult<Vec<ReviewImage>> {
        if self.reviews.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound("review"));
        }
        Ok(self.reviews.list_images(id).await?)
    }

    /// Load the review and require `user` to own it.
    pub(crate) async fn authorize(&self, user: &AuthUser, id: i64) -> ServiceResult<Review> {
        let review = self.reviews.get_by_id(id).await?;
        ensure_owner(review, user, "review")
    }

    /// Insert an image row. Callers must have run [`Self::authorize`].
    pub(crate) async fn persist_image(
        &self,
        review_id: i64,
        image_url: String,
        image_order: i32,
    ) -> ServiceResult<ReviewImage> {
        let image = self
            .reviews
            .add_image(NewReviewImage {
                review_id,
                image_url,
                image_order,
            })
            .await?;
        Ok(image)
    }

    /// First free `image_order` slot after the existing images.
    pub(crate) async fn next_image_order(&self, review_id: i64) -> ServiceResult<i32> {
        Ok(self
            .reviews
            .max_image_order(review_id)
            .await?
            .map_or(0, |max| max + 1))
    }
}

use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::require_text;
use crate::auth::{AuthUser, ensure_owner};
use crate::error::{ServiceError, ServiceResult};
use crate::models::ReviewComment;
use crate::repository::{
    CommentFilter, CommentRepository, NewComment, RepoError, ReviewRepository,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    pub review_id: i64,
    #[schema(example = "Totally agree, the broth is great.")]
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { comments, reviews }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        req: CreateCommentRequest,
    ) -> ServiceResult<ReviewComment> {
        req.validate()?;
        require_text("comment", &req.comment)?;

        if self.reviews.get_by_id(req.review_id).await?.is_none() {
            return Err(ServiceError::NotFound("review"));
        }

        let comment = self
            .comments
            .create(NewComment {
                review_id: req.review_id,
                user_id: user.user_id,
                comment: req.comment,
            })
            .await
            .map_err(|e| match e {
                RepoError::ForeignKeyViolation(_) => ServiceError::NotFound("review"),
                other => other.into(),
            })?;
        tracing::info!(
            comment_id = comment.id,
            review_id = comment.review_id,
            user_id = user.user_id,
            "comment created"
        );
        Ok(comment)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<ReviewComment> {
        self.comments
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("comment"))
    }

    pub async fn list(&self, filter: &CommentFilter) -> ServiceResult<Vec<ReviewComment>> {
        if let Some(review_id) = filter.review_id {
            if self.reviews.get_by_id(review_id).await?.is_none() {
                return Err(ServiceError::NotFound("review"));
            }
        }
        Ok(self.comments.list(filter).await?)
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        id: i64,
        req: UpdateCommentRequest,
    ) -> ServiceResult<ReviewComment> {
        let existing = self.comments.get_by_id(id).await?;
        ensure_owner(existing, user, "comment")?;
        req.validate()?;
        require_text("comment", &req.comment)?;

        self.comments
            .update(id, req.comment)
            .await?
            .ok_or(ServiceError::NotFound("comment"))
    }

    pub async fn delete(&self, user: &AuthUser, id: i64) -> ServiceResult<()> {
        let existing = self.comments.get_by_id(id).await?;
        ensure_owner(existing, user, "comment")?;

        if !self.comments.soft_delete(id).await? {
            return Err(ServiceError::NotFound("comment"));
        }
        tracing::info!(comment_id = id, user_id = user.user_id, "comment deleted");
        Ok(())
    }
}

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::ReviewComment;
use crate::repository::{CommentFilter, CommentRepository, NewComment, RepoResult};

const COMMENT_COLUMNS: &str =
    "id, review_id, user_id, comment, created_at, updated_at, deleted_at";

/// Comments disappear together with their review.
const LIVE_REVIEW: &str = "EXISTS (SELECT 1 FROM reviews r \
     WHERE r.id = review_comments.review_id AND r.deleted_at IS NULL)";

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, new: NewComment) -> RepoResult<ReviewComment> {
        let sql = format!(
            r#"
            INSERT INTO review_comments (review_id, user_id, comment)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        );
        let comment = sqlx::query_as::<_, ReviewComment>(&sql)
            .bind(new.review_id)
            .bind(new.user_id)
            .bind(&new.comment)
            .fetch_one(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<ReviewComment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM review_comments WHERE id = $1 AND deleted_at IS NULL AND {LIVE_REVIEW}"
        );
        let comment = sqlx::query_as::<_, ReviewComment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn list(&self, filter: &CommentFilter) -> RepoResult<Vec<ReviewComment>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM review_comments
            WHERE deleted_at IS NULL
              AND {LIVE_REVIEW}
              AND ($1::BIGINT IS NULL OR review_id = $1)
              AND ($2::BIGINT IS NULL OR user_id = $2)
            ORDER BY created_at DESC, id DESC
            "#
        );
        let comments = sqlx::query_as::<_, ReviewComment>(&sql)
            .bind(filter.review_id)
            .bind(filter.user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn update(&self, id: i64, comment: String) -> RepoResult<Option<ReviewComment>> {
        let sql = format!(
            r#"
            UPDATE review_comments
            SET comment = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL AND {LIVE_REVIEW}
            RETURNING {COMMENT_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, ReviewComment>(&sql)
            .bind(id)
            .bind(comment)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<bool> {
        let sql = format!(
            "UPDATE review_comments SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL AND {LIVE_REVIEW}"
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

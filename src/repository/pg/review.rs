use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::models::{Review, ReviewImage, ReviewLike};
use crate::repository::{
    LikeRepository, NewReview, NewReviewImage, RepoError, RepoResult, ReviewChanges,
    ReviewFilter, ReviewRepository,
};

const REVIEW_COLUMNS: &str = "r.id, r.menu_item_id, r.user_id, r.rating, r.title, r.comment, \
     r.is_verified, r.created_at, r.updated_at, r.deleted_at";

const IMAGE_COLUMNS: &str = "id, review_id, image_url, image_order, created_at";

/// Insert-or-get rounds before a like that keeps racing unlikes gives up.
const LIKE_ATTEMPTS: usize = 3;

pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn create(&self, new: NewReview) -> RepoResult<Review> {
        let sql = format!(
            r#"
            INSERT INTO reviews AS r (menu_item_id, user_id, rating, title, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "#
        );
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(new.menu_item_id)
            .bind(new.user_id)
            .bind(new.rating)
            .bind(&new.title)
            .bind(&new.comment)
            .fetch_one(&self.pool)
            .await?;
        Ok(review)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Review>> {
        let sql =
            format!("SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.id = $1 AND r.deleted_at IS NULL");
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let sql = format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews r
            JOIN menu_items m ON m.id = r.menu_item_id
            WHERE r.deleted_at IS NULL
              AND ($1::BIGINT IS NULL OR r.menu_item_id = $1)
              AND ($2::BIGINT IS NULL OR m.store_id = $2)
              AND ($3::BIGINT IS NULL OR r.user_id = $3)
            ORDER BY r.created_at DESC, r.id DESC
            "#
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(filter.menu_item_id)
            .bind(filter.store_id)
            .bind(filter.user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    async fn list_liked_by(&self, user_id: i64) -> RepoResult<Vec<Review>> {
        let sql = format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews r
            JOIN review_likes l ON l.review_id = r.id
            WHERE l.user_id = $1 AND r.deleted_at IS NULL
            ORDER BY r.created_at DESC, r.id DESC
            "#
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    async fn update(&self, id: i64, changes: ReviewChanges) -> RepoResult<Option<Review>> {
        let sql = format!(
            r#"
            UPDATE reviews AS r
            SET rating = COALESCE($2, r.rating),
                title = COALESCE($3, r.title),
                comment = COALESCE($4, r.comment),
                updated_at = NOW()
            WHERE r.id = $1 AND r.deleted_at IS NULL
            RETURNING {REVIEW_COLUMNS}
            "#
        );
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(changes.rating)
            .bind(changes.title)
            .bind(changes.comment)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE reviews SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_image(&self, new: NewReviewImage) -> RepoResult<ReviewImage> {
        let sql = format!(
            r#"
            INSERT INTO review_images (review_id, image_url, image_order)
            VALUES ($1, $2, $3)
            RETURNING {IMAGE_COLUMNS}
            "#
        );
        let image = sqlx::query_as::<_, ReviewImage>(&sql)
            .bind(new.review_id)
            .bind(&new.image_url)
            .bind(new.image_order)
            .fetch_one(&self.pool)
            .await?;
        Ok(image)
    }

    async fn list_images(&self, review_id: i64) -> RepoResult<Vec<ReviewImage>> {
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM review_images WHERE review_id = $1 ORDER BY image_order ASC, id ASC"
        );
        let images = sqlx::query_as::<_, ReviewImage>(&sql)
            .bind(review_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(images)
    }

    async fn max_image_order(&self, review_id: i64) -> RepoResult<Option<i32>> {
        let (max,): (Option<i32>,) =
            sqlx::query_as("SELECT MAX(image_order) FROM review_images WHERE review_id = $1")
                .bind(review_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(max)
    }
}

pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn like(&self, review_id: i64, user_id: i64) -> RepoResult<(ReviewLike, bool)> {
        for attempt in 1..=LIKE_ATTEMPTS {
            // The outer SELECT reads the pre-statement snapshot, so it only
            // returns the existing row when the insert hit the unique constraint.
            let row = sqlx::query(
                r#"
                WITH inserted AS (
                    INSERT INTO review_likes (review_id, user_id)
                    VALUES ($1, $2)
                    ON CONFLICT (review_id, user_id) DO NOTHING
                    RETURNING id, review_id, user_id, created_at
                )
                SELECT id, review_id, user_id, created_at, TRUE AS created FROM inserted
                UNION ALL
                SELECT id, review_id, user_id, created_at, FALSE AS created
                FROM review_likes
                WHERE review_id = $1 AND user_id = $2
                  AND NOT EXISTS (SELECT 1 FROM inserted)
                "#,
            )
            .bind(review_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                let like = ReviewLike {
                    id: row.try_get("id")?,
                    review_id: row.try_get("review_id")?,
                    user_id: row.try_get("user_id")?,
                    created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
                };
                let created: bool = row.try_get("created")?;
                return Ok((like, created));
            }

            // A concurrent like committed after our snapshot
            let existing = sqlx::query_as::<_, ReviewLike>(
                "SELECT id, review_id, user_id, created_at FROM review_likes WHERE review_id = $1 AND user_id = $2",
            )
            .bind(review_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(existing) = existing {
                return Ok((existing, false));
            }

            // ...and a concurrent unlike removed it again
            tracing::debug!(review_id, user_id, attempt, "like raced with unlike, retrying");
        }

        tracing::warn!(review_id, user_id, "like gave up after repeated races");
        Err(RepoError::Timeout)
    }

    async fn unlike(&self, review_id: i64, user_id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM review_likes WHERE review_id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_review(&self, review_id: i64) -> RepoResult<Vec<ReviewLike>> {
        let likes = sqlx::query_as::<_, ReviewLike>(
            r#"
            SELECT id, review_id, user_id, created_at
            FROM review_likes
            WHERE review_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(review_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn count_by_review(&self, review_id: i64) -> RepoResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM review_likes WHERE review_id = $1")
                .bind(review_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

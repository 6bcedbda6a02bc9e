use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::error::ServiceError;
use crate::gateway::error::ApiError;
use crate::gateway::extract::{AppJson, AppPath, AppQuery};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, MessageOnly, created, message, ok};
use crate::models::{Review, ReviewDetail, ReviewImage, ReviewLike};
use crate::repository::ReviewFilter;
use crate::services::{AddReviewImageRequest, CreateReviewRequest, ImageFile, UpdateReviewRequest};

/// Multipart field carrying the image files
const IMAGES_FIELD: &str = "images";

/// List reviews, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    params(ReviewFilter),
    responses((status = 200, description = "Reviews", body = ApiResponse<Vec<Review>>)),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<ReviewFilter>,
) -> ApiResult<Vec<Review>> {
    ok(state.reviews.list(&filter).await?)
}

/// Reviews liked by the caller
#[utoipa::path(
    get,
    path = "/api/v1/reviews/liked",
    responses(
        (status = 200, description = "Liked reviews", body = ApiResponse<Vec<Review>>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn list_liked_reviews(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Vec<Review>> {
    ok(state.reviews.list_liked(&user).await?)
}

/// Review with images and like count
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review", body = ApiResponse<ReviewDetail>),
        (status = 404, description = "Review not found")
    ),
    tag = "Reviews"
)]
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ReviewDetail> {
    ok(state.reviews.get(id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Menu item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(req): AppJson<CreateReviewRequest>,
) -> ApiResult<Review> {
    created("review created", state.reviews.create(&user, req).await?)
}

/// Update an own review
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    params(("id" = i64, Path, description = "Review id")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateReviewRequest>,
) -> ApiResult<Review> {
    ok(state.reviews.update(&user, id, req).await?)
}

/// Delete an own review
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted", body = ApiResponse<MessageOnly>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<MessageOnly> {
    state.reviews.delete(&user, id).await?;
    message("review deleted")
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}/images",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Images ordered by image_order", body = ApiResponse<Vec<ReviewImage>>),
        (status = 404, description = "Review not found")
    ),
    tag = "Reviews"
)]
pub async fn list_review_images(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Vec<ReviewImage>> {
    ok(state.reviews.list_images(id).await?)
}

/// Attach an already hosted image URL to an own review
#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/images",
    params(("id" = i64, Path, description = "Review id")),
    request_body = AddReviewImageRequest,
    responses(
        (status = 201, description = "Image attached", body = ApiResponse<ReviewImage>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn add_review_image(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<AddReviewImageRequest>,
) -> ApiResult<ReviewImage> {
    created("image added", state.reviews.add_image(&user, id, req).await?)
}

/// Upload image files for an own review
///
/// Multipart form with up to 10 `images` fields (jpg, jpeg, png, gif; 5 MiB each).
#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/upload-images",
    params(("id" = i64, Path, description = "Review id")),
    request_body(content_type = "multipart/form-data", description = "`images` file fields"),
    responses(
        (status = 201, description = "Images uploaded", body = ApiResponse<Vec<ReviewImage>>),
        (status = 400, description = "Invalid files"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Review not found"),
        (status = 503, description = "Image storage not configured or unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn upload_review_images(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
    mut multipart: Multipart,
) -> ApiResult<Vec<ReviewImage>> {
    let uploads = state.uploads.as_ref().ok_or_else(|| {
        ServiceError::Unavailable("image storage is not configured".to_string())
    })?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        files.push(ImageFile {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    let images = uploads.upload_review_images(&user, id, files).await?;
    created(format!("{} images uploaded", images.len()), images)
}

/// Like a review; liking twice returns the existing like
#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/like",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 201, description = "Liked", body = ApiResponse<ReviewLike>),
        (status = 200, description = "Already liked", body = ApiResponse<ReviewLike>),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn like_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ReviewLike> {
    let (like, was_created) = state.likes.like(&user, id).await?;
    if was_created {
        created("review liked", like)
    } else {
        Ok((
            StatusCode::OK,
            Json(ApiResponse::with_message("review already liked", like)),
        ))
    }
}

/// Remove a like; succeeds when there was none
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}/like",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Unliked", body = ApiResponse<MessageOnly>),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn unlike_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<MessageOnly> {
    state.likes.unlike(&user, id).await?;
    message("review unliked")
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}/likes",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Likes, newest first", body = ApiResponse<Vec<ReviewLike>>),
        (status = 404, description = "Review not found")
    ),
    tag = "Reviews"
)]
pub async fn list_review_likes(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Vec<ReviewLike>> {
    ok(state.likes.list(id).await?)
}

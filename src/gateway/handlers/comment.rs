use axum::extract::State;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::gateway::extract::{AppJson, AppPath, AppQuery};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, MessageOnly, created, message, ok};
use crate::models::ReviewComment;
use crate::repository::CommentFilter;
use crate::services::{CreateCommentRequest, UpdateCommentRequest};

/// List comments, newest first
#[utoipa::path(
    get,
    path = "/api/v1/review-comments",
    params(CommentFilter),
    responses((status = 200, description = "Comments", body = ApiResponse<Vec<ReviewComment>>)),
    tag = "Comments"
)]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<CommentFilter>,
) -> ApiResult<Vec<ReviewComment>> {
    ok(state.comments.list(&filter).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/review-comments/review/{review_id}",
    params(("review_id" = i64, Path, description = "Review id")),
    responses((status = 200, description = "Comments on the review", body = ApiResponse<Vec<ReviewComment>>)),
    tag = "Comments"
)]
pub async fn list_comments_by_review(
    State(state): State<Arc<AppState>>,
    AppPath(review_id): AppPath<i64>,
) -> ApiResult<Vec<ReviewComment>> {
    let filter = CommentFilter {
        review_id: Some(review_id),
        user_id: None,
    };
    ok(state.comments.list(&filter).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/review-comments/user/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses((status = 200, description = "Comments by the user", body = ApiResponse<Vec<ReviewComment>>)),
    tag = "Comments"
)]
pub async fn list_comments_by_user(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<i64>,
) -> ApiResult<Vec<ReviewComment>> {
    let filter = CommentFilter {
        review_id: None,
        user_id: Some(user_id),
    };
    ok(state.comments.list(&filter).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/review-comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment", body = ApiResponse<ReviewComment>),
        (status = 404, description = "Comment not found")
    ),
    tag = "Comments"
)]
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ReviewComment> {
    ok(state.comments.get(id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/review-comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<ReviewComment>),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(req): AppJson<CreateCommentRequest>,
) -> ApiResult<ReviewComment> {
    created("comment created", state.comments.create(&user, req).await?)
}

/// Update an own comment
#[utoipa::path(
    put,
    path = "/api/v1/review-comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<ReviewComment>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateCommentRequest>,
) -> ApiResult<ReviewComment> {
    ok(state.comments.update(&user, id, req).await?)
}

/// Delete an own comment
#[utoipa::path(
    delete,
    path = "/api/v1/review-comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<MessageOnly>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<MessageOnly> {
    state.comments.delete(&user, id).await?;
    message("comment deleted")
}

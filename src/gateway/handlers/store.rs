use axum::extract::State;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::gateway::extract::{AppJson, AppPath};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, MessageOnly, created, message, ok};
use crate::models::Store;
use crate::services::{CreateStoreRequest, UpdateStoreRequest};

/// List stores, newest first
#[utoipa::path(
    get,
    path = "/api/v1/stores",
    responses((status = 200, description = "Stores", body = ApiResponse<Vec<Store>>)),
    tag = "Stores"
)]
pub async fn list_stores(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Store>> {
    ok(state.stores.list().await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/stores/{id}",
    params(("id" = i64, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store", body = ApiResponse<Store>),
        (status = 404, description = "Store not found")
    ),
    tag = "Stores"
)]
pub async fn get_store(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Store> {
    ok(state.stores.get(id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = ApiResponse<Store>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Store name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn create_store(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppJson(req): AppJson<CreateStoreRequest>,
) -> ApiResult<Store> {
    created("store created", state.stores.create(req).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/stores/{id}",
    params(("id" = i64, Path, description = "Store id")),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = ApiResponse<Store>),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn update_store(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateStoreRequest>,
) -> ApiResult<Store> {
    ok(state.stores.update(id, req).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/stores/{id}",
    params(("id" = i64, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store deleted", body = ApiResponse<MessageOnly>),
        (status = 404, description = "Store not found"),
        (status = 409, description = "Store still has menu items")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn delete_store(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<MessageOnly> {
    state.stores.delete(id).await?;
    message("store deleted")
}

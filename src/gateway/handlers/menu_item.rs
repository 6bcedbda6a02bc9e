use axum::extract::State;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::gateway::extract::{AppJson, AppPath};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, MessageOnly, created, message, ok};
use crate::models::MenuItem;
use crate::services::{CreateMenuItemRequest, UpdateMenuItemRequest};

/// List menu items, newest first
#[utoipa::path(
    get,
    path = "/api/v1/menu-items",
    responses((status = 200, description = "Menu items", body = ApiResponse<Vec<MenuItem>>)),
    tag = "Menu Items"
)]
pub async fn list_menu_items(State(state): State<Arc<AppState>>) -> ApiResult<Vec<MenuItem>> {
    ok(state.menu_items.list().await?)
}

/// Menu items of one store, by id ascending
#[utoipa::path(
    get,
    path = "/api/v1/stores/{id}/menu-items",
    params(("id" = i64, Path, description = "Store id")),
    responses(
        (status = 200, description = "Menu items of the store", body = ApiResponse<Vec<MenuItem>>),
        (status = 404, description = "Store not found")
    ),
    tag = "Menu Items"
)]
pub async fn list_store_menu_items(
    State(state): State<Arc<AppState>>,
    AppPath(store_id): AppPath<i64>,
) -> ApiResult<Vec<MenuItem>> {
    ok(state.menu_items.list_by_store(store_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/menu-items/{id}",
    params(("id" = i64, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found")
    ),
    tag = "Menu Items"
)]
pub async fn get_menu_item(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<MenuItem> {
    ok(state.menu_items.get(id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/menu-items",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = ApiResponse<MenuItem>),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Items"
)]
pub async fn create_menu_item(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppJson(req): AppJson<CreateMenuItemRequest>,
) -> ApiResult<MenuItem> {
    created("menu item created", state.menu_items.create(req).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/menu-items/{id}",
    params(("id" = i64, Path, description = "Menu item id")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Items"
)]
pub async fn update_menu_item(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateMenuItemRequest>,
) -> ApiResult<MenuItem> {
    ok(state.menu_items.update(id, req).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/menu-items/{id}",
    params(("id" = i64, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Menu item deleted", body = ApiResponse<MessageOnly>),
        (status = 404, description = "Menu item not found"),
        (status = 409, description = "Menu item still has reviews")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Items"
)]
pub async fn delete_menu_item(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<MessageOnly> {
    state.menu_items.delete(id).await?;
    message("menu item deleted")
}

use axum::extract::State;
use std::sync::Arc;

use crate::auth::{AuthResponse, AuthUser, RefreshRequest, SignInRequest, SignUpRequest};
use crate::gateway::extract::AppJson;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, created, ok};
use crate::models::User;

/// Register a new user
///
/// POST /api/v1/auth/signup
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered and signed in", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input or email already registered")
    ),
    tag = "Auth"
)]
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignUpRequest>,
) -> ApiResult<AuthResponse> {
    let resp = state.auth.sign_up(req).await?;
    created("user registered", resp)
}

/// Sign in with email and password
///
/// POST /api/v1/auth/signin
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignInRequest>,
) -> ApiResult<AuthResponse> {
    ok(state.auth.sign_in(req).await?)
}

/// Exchange a refresh token for a new token pair
///
/// POST /api/v1/auth/refresh
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    ok(state.auth.refresh(req).await?)
}

/// Current user
///
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = ApiResponse<User>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<User> {
    ok(state.auth.current_user(&user).await?)
}

/// Decode a bearer token without verifying it. Development builds only.
#[cfg(feature = "debug-token")]
pub async fn debug_token(
    headers: axum::http::HeaderMap,
) -> ApiResult<crate::auth::Claims> {
    let token = crate::auth::middleware::bearer_token(&headers)?;
    let claims = crate::auth::decode_unverified(token)
        .map_err(|_| crate::gateway::error::ApiError::bad_request("token payload is not decodable"))?;
    ok(claims)
}

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderMap, Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::gateway::{error::ApiError, state::AppState};

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller, inserted into request extensions by
/// [`jwt_auth_middleware`] and pulled out by handlers as an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is case-sensitive, followed by exactly one space and a
/// non-empty token without further whitespace.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid authorization header"))?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| ApiError::unauthorized("authorization scheme must be Bearer"))?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(ApiError::unauthorized("invalid authorization header"));
    }
    Ok(token)
}

/// Fail-closed bearer authentication for mutating routes.
///
/// Any failure answers 401 before the handler runs.
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = {
        let token = bearer_token(request.headers())?;
        state.tokens.validate(token).map_err(|_| {
            tracing::debug!(path = %request.uri().path(), "rejected bearer token");
            ApiError::from(ServiceError::InvalidToken)
        })?
    };

    request.extensions_mut().insert(AuthUser {
        user_id: identity.user_id,
        email: identity.email,
    });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Absent when a route was mounted without the middleware: fail closed
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("authentication required"))
    }
}

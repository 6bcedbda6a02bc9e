//! API response envelope

use axum::{Json, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::gateway::error::ApiError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - success: `data` (and sometimes `message`)
/// - failure: `error` only
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "review created")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            message: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Placeholder payload for message-only responses
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageOnly {}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with data
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with a message and the created resource
pub fn created<T>(msg: impl Into<String>, data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message(msg, data))))
}

/// 200 with only a message
pub fn message(msg: impl Into<String>) -> ApiResult<MessageOnly> {
    Ok((
        StatusCode::OK,
        Json(ApiResponse {
            message: Some(msg.into()),
            data: None,
            error: None,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "data": 7 }));

        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "nope" }));

        let json = serde_json::to_value(ApiResponse::with_message("done", "x")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "done", "data": "x" }));
    }
}

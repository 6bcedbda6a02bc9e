//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::{AuthResponse, RefreshRequest, SignInRequest, SignUpRequest, TokenPair};
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::MessageOnly;
use crate::models::{
    MenuItem, Review, ReviewComment, ReviewDetail, ReviewImage, ReviewLike, Store, User,
};
use crate::services::{
    AddReviewImageRequest, CreateCommentRequest, CreateMenuItemRequest, CreateReviewRequest,
    CreateStoreRequest, UpdateCommentRequest, UpdateMenuItemRequest, UpdateReviewRequest,
    UpdateStoreRequest,
};

/// Bearer JWT security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token from /api/v1/auth/signin: `Authorization: Bearer <token>`",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Menu Reviews API",
        version = "1.0.0",
        description = "Stores, menu items, reviews, comments and likes with JWT authentication."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::sign_up,
        crate::gateway::handlers::auth::sign_in,
        crate::gateway::handlers::auth::refresh,
        crate::gateway::handlers::auth::me,
        crate::gateway::handlers::store::list_stores,
        crate::gateway::handlers::store::get_store,
        crate::gateway::handlers::store::create_store,
        crate::gateway::handlers::store::update_store,
        crate::gateway::handlers::store::delete_store,
        crate::gateway::handlers::menu_item::list_menu_items,
        crate::gateway::handlers::menu_item::list_store_menu_items,
        crate::gateway::handlers::menu_item::get_menu_item,
        crate::gateway::handlers::menu_item::create_menu_item,
        crate::gateway::handlers::menu_item::update_menu_item,
        crate::gateway::handlers::menu_item::delete_menu_item,
        crate::gateway::handlers::review::list_reviews,
        crate::gateway::handlers::review::list_liked_reviews,
        crate::gateway::handlers::review::get_review,
        crate::gateway::handlers::review::create_review,
        crate::gateway::handlers::review::update_review,
        crate::gateway::handlers::review::delete_review,
        crate::gateway::handlers::review::list_review_images,
        crate::gateway::handlers::review::add_review_image,
        crate::gateway::handlers::review::upload_review_images,
        crate::gateway::handlers::review::like_review,
        crate::gateway::handlers::review::unlike_review,
        crate::gateway::handlers::review::list_review_likes,
        crate::gateway::handlers::comment::list_comments,
        crate::gateway::handlers::comment::list_comments_by_review,
        crate::gateway::handlers::comment::list_comments_by_user,
        crate::gateway::handlers::comment::get_comment,
        crate::gateway::handlers::comment::create_comment,
        crate::gateway::handlers::comment::update_comment,
        crate::gateway::handlers::comment::delete_comment,
    ),
    components(
        schemas(
            HealthResponse,
            MessageOnly,
            User,
            TokenPair,
            AuthResponse,
            SignUpRequest,
            SignInRequest,
            RefreshRequest,
            Store,
            CreateStoreRequest,
            UpdateStoreRequest,
            MenuItem,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            Review,
            ReviewDetail,
            ReviewImage,
            ReviewLike,
            CreateReviewRequest,
            UpdateReviewRequest,
            AddReviewImageRequest,
            ReviewComment,
            CreateCommentRequest,
            UpdateCommentRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-up, sign-in and token refresh"),
        (name = "Stores", description = "Stores (writes require auth)"),
        (name = "Menu Items", description = "Menu items per store (writes require auth)"),
        (name = "Reviews", description = "Reviews, images and likes (writes owner-only)"),
        (name = "Comments", description = "Comments on reviews (writes owner-only)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Menu Reviews API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json_str = ApiDoc::openapi().to_json().unwrap();
        assert!(json_str.contains("Menu Reviews API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/auth/signin"));
        assert!(paths.paths.contains_key("/api/v1/reviews/{id}"));
        assert!(paths.paths.contains_key("/api/v1/reviews/{id}/upload-images"));
        assert!(paths.paths.contains_key("/api/v1/review-comments/review/{review_id}"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let components = ApiDoc::openapi().components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}

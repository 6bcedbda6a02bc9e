//! HTTP gateway: router, middleware stack and server loop.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::header,
    middleware::from_fn_with_state,
    routing::{MethodRouter, get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// OpenAPI / Swagger UI
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::jwt_auth_middleware;
use crate::config::GatewayConfig;
use crate::services::upload::{MAX_FILE_BYTES, MAX_FILES_PER_UPLOAD};
use state::AppState;

/// Multipart body cap for image uploads: every file at its limit plus form overhead.
const UPLOAD_BODY_LIMIT: usize = MAX_FILES_PER_UPLOAD * MAX_FILE_BYTES + 1024 * 1024;

/// Put a method router behind bearer authentication.
///
/// `route_layer` only runs the middleware for matched methods, so public
/// reads on the same path stay open.
fn protected(
    state: &Arc<AppState>,
    route: MethodRouter<Arc<AppState>>,
) -> MethodRouter<Arc<AppState>> {
    route.route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// Build the complete application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let s = &state;

    // ==========================================================================
    // Auth
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::sign_up))
        .route("/signin", post(handlers::auth::sign_in))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/me", protected(s, get(handlers::auth::me)));

    #[cfg(feature = "debug-token")]
    let auth_routes = auth_routes.route("/debug-token", get(handlers::auth::debug_token));

    // ==========================================================================
    // Stores and menu items
    // ==========================================================================
    let catalog_routes = Router::new()
        .route(
            "/stores",
            get(handlers::store::list_stores).merge(protected(s, post(handlers::store::create_store))),
        )
        .route(
            "/stores/{id}",
            get(handlers::store::get_store).merge(protected(
                s,
                put(handlers::store::update_store)
                    .delete(handlers::store::delete_store),
            )),
        )
        .route(
            "/stores/{id}/menu-items",
            get(handlers::menu_item::list_store_menu_items),
        )
        .route(
            "/menu-items",
            get(handlers::menu_item::list_menu_items)
                .merge(protected(s, post(handlers::menu_item::create_menu_item))),
        )
        .route(
            "/menu-items/{id}",
            get(handlers::menu_item::get_menu_item).merge(protected(
                s,
                put(handlers::menu_item::update_menu_item)
                    .delete(handlers::menu_item::delete_menu_item),
            )),
        );

    // ==========================================================================
    // Reviews, images and likes
    // ==========================================================================
    let review_routes = Router::new()
        .route(
            "/reviews",
            get(handlers::review::list_reviews)
                .merge(protected(s, post(handlers::review::create_review))),
        )
        .route(
            "/reviews/liked",
            protected(s, get(handlers::review::list_liked_reviews)),
        )
        .route(
            "/reviews/{id}",
            get(handlers::review::get_review).merge(protected(
                s,
                put(handlers::review::update_review)
                    .delete(handlers::review::delete_review),
            )),
        )
        .route(
            "/reviews/{id}/images",
            get(handlers::review::list_review_images)
                .merge(protected(s, post(handlers::review::add_review_image))),
        )
        .route(
            "/reviews/{id}/upload-images",
            protected(
                s,
                post(handlers::review::upload_review_images)
                    .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
            ),
        )
        .route("/reviews/{id}/likes", get(handlers::review::list_review_likes))
        .route(
            "/reviews/{id}/like",
            protected(
                s,
                post(handlers::review::like_review).delete(handlers::review::unlike_review),
            ),
        );

    // ==========================================================================
    // Comments
    // ==========================================================================
    let comment_routes = Router::new()
        .route(
            "/review-comments",
            get(handlers::comment::list_comments)
                .merge(protected(s, post(handlers::comment::create_comment))),
        )
        .route(
            "/review-comments/{id}",
            get(handlers::comment::get_comment).merge(protected(
                s,
                put(handlers::comment::update_comment)
                    .delete(handlers::comment::delete_comment),
            )),
        )
        .route(
            "/review-comments/review/{review_id}",
            get(handlers::comment::list_comments_by_review),
        )
        .route(
            "/review-comments/user/{user_id}",
            get(handlers::comment::list_comments_by_user),
        );

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes)
        .merge(catalog_routes)
        .merge(review_routes)
        .merge(comment_routes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind and serve until Ctrl-C.
pub async fn run_server(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_router(Arc::new(state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

use anyhow::{Context, Result};
use sqlx::PgPool;

/// Create every table, constraint and index if missing. Safe to run on
/// each startup.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing PostgreSQL schema...");

    for &(name, ddl) in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create {}", name))?;
    }

    tracing::info!("PostgreSQL schema ready");
    Ok(())
}

const SCHEMA: &[(&str, &str)] = &[
    ("users table", CREATE_USERS_TABLE),
    ("stores table", CREATE_STORES_TABLE),
    ("menu_items table", CREATE_MENU_ITEMS_TABLE),
    ("menu_items store index", CREATE_MENU_ITEMS_STORE_INDEX),
    ("reviews table", CREATE_REVIEWS_TABLE),
    ("reviews menu item index", CREATE_REVIEWS_MENU_ITEM_INDEX),
    ("reviews user index", CREATE_REVIEWS_USER_INDEX),
    ("review_images table", CREATE_REVIEW_IMAGES_TABLE),
    ("review_likes table", CREATE_REVIEW_LIKES_TABLE),
    ("review_comments table", CREATE_REVIEW_COMMENTS_TABLE),
    ("review_comments review index", CREATE_REVIEW_COMMENTS_REVIEW_INDEX),
];

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL,
    name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT users_email_key UNIQUE (email)
)
"#;

const CREATE_STORES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stores (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT stores_name_key UNIQUE (name)
)
"#;

const CREATE_MENU_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS menu_items (
    id BIGSERIAL PRIMARY KEY,
    store_id BIGINT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price NUMERIC(10, 2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT menu_items_store_id_fkey FOREIGN KEY (store_id)
        REFERENCES stores (id) ON DELETE RESTRICT
)
"#;

const CREATE_MENU_ITEMS_STORE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_menu_items_store_id ON menu_items (store_id)";

const CREATE_REVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id BIGSERIAL PRIMARY KEY,
    menu_item_id BIGINT NOT NULL,
    user_id BIGINT NOT NULL,
    rating INTEGER NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    comment TEXT NOT NULL DEFAULT '',
    is_verified BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT reviews_rating_check CHECK (rating BETWEEN 1 AND 5),
    CONSTRAINT reviews_menu_item_id_fkey FOREIGN KEY (menu_item_id)
        REFERENCES menu_items (id) ON DELETE RESTRICT,
    CONSTRAINT reviews_user_id_fkey FOREIGN KEY (user_id)
        REFERENCES users (id) ON DELETE RESTRICT
)
"#;

const CREATE_REVIEWS_MENU_ITEM_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reviews_menu_item_id ON reviews (menu_item_id) WHERE deleted_at IS NULL";

const CREATE_REVIEWS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reviews_user_id ON reviews (user_id) WHERE deleted_at IS NULL";

const CREATE_REVIEW_IMAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS review_images (
    id BIGSERIAL PRIMARY KEY,
    review_id BIGINT NOT NULL,
    image_url TEXT NOT NULL,
    image_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT review_images_review_id_fkey FOREIGN KEY (review_id)
        REFERENCES reviews (id) ON DELETE CASCADE
)
"#;

const CREATE_REVIEW_LIKES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS review_likes (
    id BIGSERIAL PRIMARY KEY,
    review_id BIGINT NOT NULL,
    user_id BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT review_likes_review_user_key UNIQUE (review_id, user_id),
    CONSTRAINT review_likes_review_id_fkey FOREIGN KEY (review_id)
        REFERENCES reviews (id) ON DELETE CASCADE,
    CONSTRAINT review_likes_user_id_fkey FOREIGN KEY (user_id)
        REFERENCES users (id) ON DELETE CASCADE
)
"#;

const CREATE_REVIEW_COMMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS review_comments (
    id BIGSERIAL PRIMARY KEY,
    review_id BIGINT NOT NULL,
    user_id BIGINT NOT NULL,
    comment TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT review_comments_review_id_fkey FOREIGN KEY (review_id)
        REFERENCES reviews (id) ON DELETE RESTRICT,
    CONSTRAINT review_comments_user_id_fkey FOREIGN KEY (user_id)
        REFERENCES users (id) ON DELETE RESTRICT
)
"#;

const CREATE_REVIEW_COMMENTS_REVIEW_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_review_comments_review_id ON review_comments (review_id) WHERE deleted_at IS NULL";

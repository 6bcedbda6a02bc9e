use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::MenuItem;
use crate::repository::{MenuItemChanges, MenuItemRepository, NewMenuItem, RepoResult};

const MENU_ITEM_COLUMNS: &str = "id, store_id, name, description, price, created_at, updated_at";

pub struct PgMenuItemRepository {
    pool: PgPool,
}

impl PgMenuItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuItemRepository for PgMenuItemRepository {
    async fn create(&self, new: NewMenuItem) -> RepoResult<MenuItem> {
        let sql = format!(
            r#"
            INSERT INTO menu_items (store_id, name, description, price)
            VALUES ($1, $2, $3, $4)
            RETURNING {MENU_ITEM_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(new.store_id)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.price)
            .fetch_one(&self.pool)
            .await?;
        Ok(item)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>> {
        let sql = format!("SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = $1");
        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn list(&self) -> RepoResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items ORDER BY created_at DESC, id DESC"
        );
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn list_by_store(&self, store_id: i64) -> RepoResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE store_id = $1 ORDER BY id ASC"
        );
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn update(&self, id: i64, changes: MenuItemChanges) -> RepoResult<Option<MenuItem>> {
        let sql = format!(
            r#"
            UPDATE menu_items
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MENU_ITEM_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.price)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

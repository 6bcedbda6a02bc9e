use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::Store;
use crate::repository::{NewStore, RepoResult, StoreChanges, StoreRepository};

const STORE_COLUMNS: &str = "id, name, address, phone, created_at, updated_at";

pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn create(&self, new: NewStore) -> RepoResult<Store> {
        let sql = format!(
            "INSERT INTO stores (name, address, phone) VALUES ($1, $2, $3) RETURNING {STORE_COLUMNS}"
        );
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(&new.name)
            .bind(&new.address)
            .bind(&new.phone)
            .fetch_one(&self.pool)
            .await?;
        Ok(store)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Store>> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1");
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn list(&self) -> RepoResult<Vec<Store>> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores ORDER BY created_at DESC, id DESC");
        let stores = sqlx::query_as::<_, Store>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(stores)
    }

    async fn update(&self, id: i64, changes: StoreChanges) -> RepoResult<Option<Store>> {
        let sql = format!(
            r#"
            UPDATE stores
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                phone = COALESCE($4, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "#
        );
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.address)
            .bind(changes.phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

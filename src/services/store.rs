use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::require_text;
use crate::error::{ServiceError, ServiceResult};
use crate::models::Store;
use crate::repository::{NewStore, RepoError, StoreChanges, StoreRepository};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStoreRequest {
    #[schema(example = "Pho Corner")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStoreRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
}

fn map_duplicate_name(e: RepoError) -> ServiceError {
    match e {
        RepoError::UniqueViolation(_) => {
            ServiceError::Conflict("a store with this name already exists".to_string())
        }
        other => other.into(),
    }
}

pub struct StoreService {
    stores: Arc<dyn StoreRepository>,
}

impl StoreService {
    pub fn new(stores: Arc<dyn StoreRepository>) -> Self {
        Self { stores }
    }

    pub async fn create(&self, req: CreateStoreRequest) -> ServiceResult<Store> {
        req.validate()?;
        require_text("name", &req.name)?;

        let store = self
            .stores
            .create(NewStore {
                name: req.name.trim().to_string(),
                address: req.address,
                phone: req.phone,
            })
            .await
            .map_err(map_duplicate_name)?;
        tracing::info!(store_id = store.id, "store created");
        Ok(store)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Store> {
        self.stores
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("store"))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Store>> {
        Ok(self.stores.list().await?)
    }

    pub async fn update(&self, id: i64, req: UpdateStoreRequest) -> ServiceResult<Store> {
        req.validate()?;
        if let Some(name) = &req.name {
            require_text("name", name)?;
        }

        self.stores
            .update(
                id,
                StoreChanges {
                    name: req.name.map(|n| n.trim().to_string()),
                    address: req.address,
                    phone: req.phone,
                },
            )
            .await
            .map_err(map_duplicate_name)?
            .ok_or(ServiceError::NotFound("store"))
    }

    /// Refused with `Conflict` while menu items still belong to the store.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let deleted = self.stores.delete(id).await.map_err(|e| match e {
            RepoError::ForeignKeyViolation(_) => ServiceError::Conflict(
                "store still has menu items; delete them first".to_string(),
            ),
            other => other.into(),
        })?;
        if !deleted {
            return Err(ServiceError::NotFound("store"));
        }
        tracing::info!(store_id = id, "store deleted");
        Ok(())
    }
}

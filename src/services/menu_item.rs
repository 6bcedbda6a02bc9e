use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::require_text;
use crate::error::{ServiceError, ServiceResult};
use crate::models::MenuItem;
use crate::repository::{
    MenuItemChanges, MenuItemRepository, NewMenuItem, RepoError, StoreRepository,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMenuItemRequest {
    pub store_id: i64,
    #[schema(example = "Beef noodle soup")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[schema(value_type = Option<String>, example = "12.50")]
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMenuItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "12.50")]
    pub price: Option<Decimal>,
}

/// Largest value the `NUMERIC(10, 2)` price column holds.
// 9_999_999_999 (= 0x2_540B_E3FF) at scale 2, i.e. 99_999_999.99; `Decimal::new` is not const.
const MAX_PRICE: Decimal = Decimal::from_parts(0x540B_E3FF, 2, 0, false, 2);

fn check_price(price: Option<Decimal>) -> ServiceResult<()> {
    let Some(price) = price else {
        return Ok(());
    };
    if price.is_sign_negative() {
        return Err(ServiceError::validation("price: must not be negative"));
    }
    // Stored rounded to cents
    if price.round_dp(2) > MAX_PRICE {
        return Err(ServiceError::validation(format!(
            "price: must be at most {}",
            MAX_PRICE
        )));
    }
    Ok(())
}

pub struct MenuItemService {
    menu_items: Arc<dyn MenuItemRepository>,
    stores: Arc<dyn StoreRepository>,
}

impl MenuItemService {
    pub fn new(menu_items: Arc<dyn MenuItemRepository>, stores: Arc<dyn StoreRepository>) -> Self {
        Self { menu_items, stores }
    }

    pub async fn create(&self, req: CreateMenuItemRequest) -> ServiceResult<MenuItem> {
        req.validate()?;
        require_text("name", &req.name)?;
        check_price(req.price)?;

        if self.stores.get_by_id(req.store_id).await?.is_none() {
            return Err(ServiceError::NotFound("store"));
        }

        let item = self
            .menu_items
            .create(NewMenuItem {
                store_id: req.store_id,
                name: req.name.trim().to_string(),
                description: req.description,
                price: req.price,
            })
            .await
            .map_err(|e| match e {
                // Store removed between the check and the insert
                RepoError::ForeignKeyViolation(_) => ServiceError::NotFound("store"),
                other => other.into(),
            })?;
        tracing::info!(menu_item_id = item.id, store_id = item.store_id, "menu item created");
        Ok(item)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<MenuItem> {
        self.menu_items
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("menu item"))
    }

    pub async fn list(&self) -> ServiceResult<Vec<MenuItem>> {
        Ok(self.menu_items.list().await?)
    }

    pub async fn list_by_store(&self, store_id: i64) -> ServiceResult<Vec<MenuItem>> {
        if self.stores.get_by_id(store_id).await?.is_none() {
            return Err(ServiceError::NotFound("store"));
        }
        Ok(self.menu_items.list_by_store(store_id).await?)
    }

    pub async fn update(&self, id: i64, req: UpdateMenuItemRequest) -> ServiceResult<MenuItem> {
        req.validate()?;
        if let Some(name) = &req.name {
            require_text("name", name)?;
        }
        check_price(req.price)?;

        self.menu_items
            .update(
                id,
                MenuItemChanges {
                    name: req.name.map(|n| n.trim().to_string()),
                    description: req.description,
                    price: req.price,
                },
            )
            .await?
            .ok_or(ServiceError::NotFound("menu item"))
    }

    /// Refused with `Conflict` while reviews (deleted ones included) still
    /// reference the item.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let deleted = self.menu_items.delete(id).await.map_err(|e| match e {
            RepoError::ForeignKeyViolation(_) => {
                ServiceError::Conflict("menu item still has reviews".to_string())
            }
            other => other.into(),
        })?;
        if !deleted {
            return Err(ServiceError::NotFound("menu item"));
        }
        tracing::info!(menu_item_id = id, "menu item deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::repository::memory::MemoryStore;
    use crate::repository::{NewReview, NewStore, ReviewRepository, UserRepository};
    use std::str::FromStr;

    async fn setup() -> (MenuItemService, Arc<MemoryStore>, i64) {
        let repo = Arc::new(MemoryStore::new());
        let store = StoreRepository::create(
            repo.as_ref(),
            NewStore {
                name: "S".into(),
                address: String::new(),
                phone: String::new(),
            },
        )
        .await
        .unwrap();
        let svc = MenuItemService::new(repo.clone(), repo.clone());
        (svc, repo, store.id)
    }

    fn create_req(store_id: i64, name: &str, price: Option<&str>) -> CreateMenuItemRequest {
        CreateMenuItemRequest {
            store_id,
            name: name.to_string(),
            description: String::new(),
            price: price.map(|p| Decimal::from_str(p).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_store() {
        let (svc, _, store_id) = setup().await;
        let item = svc.create(create_req(store_id, "Pho", Some("12.50"))).await.unwrap();
        assert_eq!(item.price, Some(Decimal::new(1250, 2)));

        let err = svc.create(create_req(store_id + 100, "Pho", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("store")));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let (svc, _, store_id) = setup().await;
        let err = svc.create(create_req(store_id, "Pho", Some("-1"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(svc.create(create_req(store_id, "Free", Some("0"))).await.is_ok());
    }

    #[tokio::test]
    async fn test_price_must_fit_column() {
        let (svc, _, store_id) = setup().await;
        let item = svc
            .create(create_req(store_id, "Max", Some("99999999.99")))
            .await
            .unwrap();

        for too_big in ["100000000", "99999999.999"] {
            let err = svc
                .create(create_req(store_id, "Big", Some(too_big)))
                .await
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "validation failed: price: must be at most 99999999.99"
            );
        }

        let err = svc
            .update(
                item.id,
                UpdateMenuItemRequest {
                    name: None,
                    description: None,
                    price: Some(Decimal::from_str("1000000000").unwrap()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.get(item.id).await.unwrap().price, Some(MAX_PRICE));
    }

    #[tokio::test]
    async fn test_list_by_store_is_id_ascending() {
        let (svc, _, store_id) = setup().await;
        let a = svc.create(create_req(store_id, "A", None)).await.unwrap();
        let b = svc.create(create_req(store_id, "B", None)).await.unwrap();

        let ids: Vec<i64> = svc
            .list_by_store(store_id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);

        let err = svc.list_by_store(store_id + 100).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("store")));
    }

    #[tokio::test]
    async fn test_reviewed_item_cannot_be_deleted() {
        let (svc, repo, store_id) = setup().await;
        let item = svc.create(create_req(store_id, "Pho", None)).await.unwrap();
        let user = UserRepository::create(
            repo.as_ref(),
            NewUser {
                email: "a@example.com".into(),
                name: "A".into(),
                password_hash: "x".into(),
            },
        )
        .await
        .unwrap();
        ReviewRepository::create(
            repo.as_ref(),
            NewReview {
                menu_item_id: item.id,
                user_id: user.id,
                rating: 5,
                title: String::new(),
                comment: String::new(),
            },
        )
        .await
        .unwrap();

        let err = svc.delete(item.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(svc.get(item.id).await.is_ok());
    }
}

//! In-memory repositories.
//!
//! Backs the server when no database is configured and drives the test
//! suite. One mutex guards every table so the unique and foreign-key rules
//! hold the same way they do in Postgres.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    CommentFilter, CommentRepository, LikeRepository, MenuItemChanges, MenuItemRepository,
    NewComment, NewMenuItem, NewReview, NewReviewImage, NewStore, RepoError, RepoResult,
    ReviewChanges, ReviewFilter, ReviewRepository, StoreChanges, StoreRepository,
    UserRepository,
};
use crate::models::{
    MenuItem, NewUser, Review, ReviewComment, ReviewImage, ReviewLike, Store, User,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    stores: BTreeMap<i64, Store>,
    menu_items: BTreeMap<i64, MenuItem>,
    reviews: BTreeMap<i64, Review>,
    images: BTreeMap<i64, ReviewImage>,
    likes: BTreeMap<i64, ReviewLike>,
    comments: BTreeMap<i64, ReviewComment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_review(&self, id: i64) -> Option<&Review> {
        self.reviews.get(&id).filter(|r| r.deleted_at.is_none())
    }

    /// Not deleted itself and its review is not deleted either.
    fn comment_visible(&self, comment: &ReviewComment) -> bool {
        comment.deleted_at.is_none() && self.live_review(comment.review_id).is_some()
    }
}

/// Newest first, ties broken by id descending.
fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (chrono::DateTime<Utc>, i64),
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // No invariant spans a panic point, so a poisoned lock is still usable
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new: NewUser) -> RepoResult<User> {
        let mut t = self.tables();
        if t.users.values().any(|u| u.email == new.email) {
            return Err(RepoError::UniqueViolation("users_email_key".into()));
        }
        let now = Utc::now();
        let user = User {
            id: t.next_id(),
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.tables().users.len() as i64)
    }
}

#[async_trait]
impl StoreRepository for MemoryStore {
    async fn create(&self, new: NewStore) -> RepoResult<Store> {
        let mut t = self.tables();
        if t.stores.values().any(|s| s.name == new.name) {
            return Err(RepoError::UniqueViolation("stores_name_key".into()));
        }
        let now = Utc::now();
        let store = Store {
            id: t.next_id(),
            name: new.name,
            address: new.address,
            phone: new.phone,
            created_at: now,
            updated_at: now,
        };
        t.stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Store>> {
        Ok(self.tables().stores.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Store>> {
        let mut stores: Vec<Store> = self.tables().stores.values().cloned().collect();
        newest_first(&mut stores, |s| (s.created_at, s.id));
        Ok(stores)
    }

    async fn update(&self, id: i64, changes: StoreChanges) -> RepoResult<Option<Store>> {
        let mut t = self.tables();
        if let Some(name) = &changes.name {
            if t.stores.values().any(|s| s.id != id && &s.name == name) {
                return Err(RepoError::UniqueViolation("stores_name_key".into()));
            }
        }
        let Some(store) = t.stores.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            store.name = name;
        }
        if let Some(address) = changes.address {
            store.address = address;
        }
        if let Some(phone) = changes.phone {
            store.phone = phone;
        }
        store.updated_at = Utc::now();
        Ok(Some(store.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables();
        if t.menu_items.values().any(|m| m.store_id == id) {
            return Err(RepoError::ForeignKeyViolation(
                "menu_items_store_id_fkey".into(),
            ));
        }
        Ok(t.stores.remove(&id).is_some())
    }
}

#[async_trait]
impl MenuItemRepository for MemoryStore {
    async fn create(&self, new: NewMenuItem) -> RepoResult<MenuItem> {
        let mut t = self.tables();
        if !t.stores.contains_key(&new.store_id) {
            return Err(RepoError::ForeignKeyViolation(
                "menu_items_store_id_fkey".into(),
            ));
        }
        let now = Utc::now();
        let item = MenuItem {
            id: t.next_id(),
            store_id: new.store_id,
            name: new.name,
            description: new.description,
            price: new.price,
            created_at: now,
            updated_at: now,
        };
        t.menu_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>> {
        Ok(self.tables().menu_items.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self.tables().menu_items.values().cloned().collect();
        newest_first(&mut items, |m| (m.created_at, m.id));
        Ok(items)
    }

    async fn list_by_store(&self, store_id: i64) -> RepoResult<Vec<MenuItem>> {
        // BTreeMap iteration is already id ascending
        Ok(self
            .tables()
            .menu_items
            .values()
            .filter(|m| m.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: MenuItemChanges) -> RepoResult<Option<MenuItem>> {
        let mut t = self.tables();
        let Some(item) = t.menu_items.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(description) = changes.description {
            item.description = description;
        }
        if let Some(price) = changes.price {
            item.price = Some(price);
        }
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables();
        if t.reviews.values().any(|r| r.menu_item_id == id) {
            return Err(RepoError::ForeignKeyViolation(
                "reviews_menu_item_id_fkey".into(),
            ));
        }
        Ok(t.menu_items.remove(&id).is_some())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create(&self, new: NewReview) -> RepoResult<Review> {
        let mut t = self.tables();
        if !t.menu_items.contains_key(&new.menu_item_id) {
            return Err(RepoError::ForeignKeyViolation(
                "reviews_menu_item_id_fkey".into(),
            ));
        }
        if !t.users.contains_key(&new.user_id) {
            return Err(RepoError::ForeignKeyViolation("reviews_user_id_fkey".into()));
        }
        if !(1..=5).contains(&new.rating) {
            return Err(RepoError::CheckViolation("reviews_rating_check".into()));
        }
        let now = Utc::now();
        let review = Review {
            id: t.next_id(),
            menu_item_id: new.menu_item_id,
            user_id: new.user_id,
            rating: new.rating,
            title: new.title,
            comment: new.comment,
            is_verified: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Review>> {
        Ok(self.tables().live_review(id).cloned())
    }

    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let t = self.tables();
        let mut reviews: Vec<Review> = t
            .reviews
            .values()
            .filter(|r| r.deleted_at.is_none())
            .filter(|r| filter.menu_item_id.is_none_or(|id| r.menu_item_id == id))
            .filter(|r| filter.user_id.is_none_or(|id| r.user_id == id))
            .filter(|r| {
                filter.store_id.is_none_or(|store_id| {
                    t.menu_items
                        .get(&r.menu_item_id)
                        .is_some_and(|m| m.store_id == store_id)
                })
            })
            .cloned()
            .collect();
        newest_first(&mut reviews, |r| (r.created_at, r.id));
        Ok(reviews)
    }

    async fn list_liked_by(&self, user_id: i64) -> RepoResult<Vec<Review>> {
        let t = self.tables();
        let mut reviews: Vec<Review> = t
            .likes
            .values()
            .filter(|l| l.user_id == user_id)
            .filter_map(|l| t.live_review(l.review_id).cloned())
            .collect();
        newest_first(&mut reviews, |r| (r.created_at, r.id));
        Ok(reviews)
    }

    async fn update(&self, id: i64, changes: ReviewChanges) -> RepoResult<Option<Review>> {
        if changes.rating.is_some_and(|r| !(1..=5).contains(&r)) {
            return Err(RepoError::CheckViolation("reviews_rating_check".into()));
        }
        let mut t = self.tables();
        let Some(review) = t.reviews.get_mut(&id).filter(|r| r.deleted_at.is_none()) else {
            return Ok(None);
        };
        if let Some(rating) = changes.rating {
            review.rating = rating;
        }
        if let Some(title) = changes.title {
            review.title = title;
        }
        if let Some(comment) = changes.comment {
            review.comment = comment;
        }
        review.updated_at = Utc::now();
        Ok(Some(review.clone()))
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables();
        match t.reviews.get_mut(&id).filter(|r| r.deleted_at.is_none()) {
            Some(review) => {
                review.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_image(&self, new: NewReviewImage) -> RepoResult<ReviewImage> {
        let mut t = self.tables();
        if !t.reviews.contains_key(&new.review_id) {
            return Err(RepoError::ForeignKeyViolation(
                "review_images_review_id_fkey".into(),
            ));
        }
        let image = ReviewImage {
            id: t.next_id(),
            review_id: new.review_id,
            image_url: new.image_url,
            image_order: new.image_order,
            created_at: Utc::now(),
        };
        t.images.insert(image.id, image.clone());
        Ok(image)
    }

    async fn list_images(&self, review_id: i64) -> RepoResult<Vec<ReviewImage>> {
        let mut images: Vec<ReviewImage> = self
            .tables()
            .images
            .values()
            .filter(|i| i.review_id == review_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| (i.image_order, i.id));
        Ok(images)
    }

    async fn max_image_order(&self, review_id: i64) -> RepoResult<Option<i32>> {
        Ok(self
            .tables()
            .images
            .values()
            .filter(|i| i.review_id == review_id)
            .map(|i| i.image_order)
            .max())
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn like(&self, review_id: i64, user_id: i64) -> RepoResult<(ReviewLike, bool)> {
        let mut t = self.tables();
        if let Some(existing) = t
            .likes
            .values()
            .find(|l| l.review_id == review_id && l.user_id == user_id)
        {
            return Ok((existing.clone(), false));
        }
        if !t.reviews.contains_key(&review_id) {
            return Err(RepoError::ForeignKeyViolation(
                "review_likes_review_id_fkey".into(),
            ));
        }
        let like = ReviewLike {
            id: t.next_id(),
            review_id,
            user_id,
            created_at: Utc::now(),
        };
        t.likes.insert(like.id, like.clone());
        Ok((like, true))
    }

    async fn unlike(&self, review_id: i64, user_id: i64) -> RepoResult<bool> {
        let mut t = self.tables();
        let id = t
            .likes
            .values()
            .find(|l| l.review_id == review_id && l.user_id == user_id)
            .map(|l| l.id);
        Ok(id.and_then(|id| t.likes.remove(&id)).is_some())
    }

    async fn list_by_review(&self, review_id: i64) -> RepoResult<Vec<ReviewLike>> {
        let mut likes: Vec<ReviewLike> = self
            .tables()
            .likes
            .values()
            .filter(|l| l.review_id == review_id)
            .cloned()
            .collect();
        newest_first(&mut likes, |l| (l.created_at, l.id));
        Ok(likes)
    }

    async fn count_by_review(&self, review_id: i64) -> RepoResult<i64> {
        Ok(self
            .tables()
            .likes
            .values()
            .filter(|l| l.review_id == review_id)
            .count() as i64)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, new: NewComment) -> RepoResult<ReviewComment> {
        let mut t = self.tables();
        if t.live_review(new.review_id).is_none() {
            return Err(RepoError::ForeignKeyViolation(
                "review_comments_review_id_fkey".into(),
            ));
        }
        let now = Utc::now();
        let comment = ReviewComment {
            id: t.next_id(),
            review_id: new.review_id,
            user_id: new.user_id,
            comment: new.comment,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<ReviewComment>> {
        let t = self.tables();
        Ok(t.comments.get(&id).filter(|c| t.comment_visible(c)).cloned())
    }

    async fn list(&self, filter: &CommentFilter) -> RepoResult<Vec<ReviewComment>> {
        let t = self.tables();
        let mut comments: Vec<ReviewComment> = t
            .comments
            .values()
            .filter(|c| t.comment_visible(c))
            .filter(|c| filter.review_id.is_none_or(|id| c.review_id == id))
            .filter(|c| filter.user_id.is_none_or(|id| c.user_id == id))
            .cloned()
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn update(&self, id: i64, comment: String) -> RepoResult<Option<ReviewComment>> {
        let mut t = self.tables();
        if !t.comments.get(&id).is_some_and(|c| t.comment_visible(c)) {
            return Ok(None);
        }
        let Some(existing) = t.comments.get_mut(&id) else {
            return Ok(None);
        };
        existing.comment = comment;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables();
        if !t.comments.get(&id).is_some_and(|c| t.comment_visible(c)) {
            return Ok(false);
        }
        match t.comments.get_mut(&id) {
            Some(comment) => {
                comment.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

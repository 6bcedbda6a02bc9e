//! Demo data for local development (`--seed`).
//!
//! Inserted only into an empty user table, so restarting with `--seed` is
//! harmless. All demo accounts share [`DEMO_PASSWORD`].

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::auth::PasswordHashing;
use crate::models::NewUser;
use crate::repository::{NewComment, NewMenuItem, NewReview, NewStore, Repositories};

pub const DEMO_PASSWORD: &str = "password123";

const USERS: &[(&str, &str)] = &[
    ("alice@example.com", "Alice"),
    ("bob@example.com", "Bob"),
    ("carol@example.com", "Carol"),
];

const STORES: &[(&str, &str, &str)] = &[
    ("Pho Corner", "12 Market Street", "555-0101"),
    ("Bella Pasta", "48 Harbor Road", "555-0102"),
];

/// (store index, name, description, price in cents)
const MENU_ITEMS: &[(usize, &str, &str, i64)] = &[
    (0, "Beef noodle soup", "Slow-simmered broth with rare beef", 1250),
    (0, "Spring rolls", "Fresh rolls with shrimp and herbs", 700),
    (1, "Spaghetti carbonara", "Guanciale, egg yolk, pecorino", 1600),
    (1, "Tiramisu", "House-made, served chilled", 850),
];

/// (user index, menu item index, rating, title, comment)
const REVIEWS: &[(usize, usize, i32, &str, &str)] = &[
    (0, 0, 5, "Best pho in town", "Rich broth and generous portions."),
    (1, 0, 4, "Solid bowl", "A little salty but very good."),
    (2, 2, 3, "Decent", "Creamy, could use more pepper."),
    (0, 3, 5, "Perfect dessert", ""),
];

/// (user index, review index, comment)
const COMMENTS: &[(usize, usize, &str)] = &[
    (1, 0, "Agreed, the broth is amazing."),
    (2, 0, "Going there this weekend!"),
    (0, 2, "Try asking for extra pecorino."),
];

/// Returns `false` when users already exist and nothing was inserted.
pub async fn seed_demo_data(repos: &Repositories, hashing: &PasswordHashing) -> Result<bool> {
    if repos.users.count().await? > 0 {
        tracing::info!("users exist, skipping demo data");
        return Ok(false);
    }

    let password_hash = hashing
        .hash(DEMO_PASSWORD)
        .context("failed to hash demo password")?;

    let mut users = Vec::with_capacity(USERS.len());
    for (email, name) in USERS {
        let user = repos
            .users
            .create(NewUser {
                email: email.to_string(),
                name: name.to_string(),
                password_hash: password_hash.clone(),
            })
            .await?;
        users.push(user.id);
    }

    let mut stores = Vec::with_capacity(STORES.len());
    for (name, address, phone) in STORES {
        let store = repos
            .stores
            .create(NewStore {
                name: name.to_string(),
                address: address.to_string(),
                phone: phone.to_string(),
            })
            .await?;
        stores.push(store.id);
    }

    let mut items = Vec::with_capacity(MENU_ITEMS.len());
    for (store, name, description, cents) in MENU_ITEMS {
        let item = repos
            .menu_items
            .create(NewMenuItem {
                store_id: stores[*store],
                name: name.to_string(),
                description: description.to_string(),
                price: Some(Decimal::new(*cents, 2)),
            })
            .await?;
        items.push(item.id);
    }

    let mut reviews = Vec::with_capacity(REVIEWS.len());
    for (user, item, rating, title, comment) in REVIEWS {
        let review = repos
            .reviews
            .create(NewReview {
                menu_item_id: items[*item],
                user_id: users[*user],
                rating: *rating,
                title: title.to_string(),
                comment: comment.to_string(),
            })
            .await?;
        reviews.push(review.id);
    }

    for (user, review, comment) in COMMENTS {
        repos
            .comments
            .create(NewComment {
                review_id: reviews[*review],
                user_id: users[*user],
                comment: comment.to_string(),
            })
            .await?;
    }

    repos.likes.like(reviews[0], users[1]).await?;
    repos.likes.like(reviews[0], users[2]).await?;

    tracing::info!(
        users = users.len(),
        stores = stores.len(),
        menu_items = items.len(),
        reviews = reviews.len(),
        comments = COMMENTS.len(),
        "demo data inserted"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ReviewFilter;
    use argon2::Params;

    #[tokio::test]
    async fn test_seed_runs_once() {
        let repos = Repositories::in_memory();
        let hashing = PasswordHashing::new(Params::new(1024, 1, 1, None).unwrap()).unwrap();

        assert!(seed_demo_data(&repos, &hashing).await.unwrap());
        assert!(!seed_demo_data(&repos, &hashing).await.unwrap());

        assert_eq!(repos.users.count().await.unwrap(), USERS.len() as i64);
        let reviews = repos.reviews.list(&ReviewFilter::default()).await.unwrap();
        assert_eq!(reviews.len(), REVIEWS.len());
        assert_eq!(repos.likes.count_by_review(reviews.last().unwrap().id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_demo_password_verifies() {
        let repos = Repositories::in_memory();
        let hashing = PasswordHashing::new(Params::new(1024, 1, 1, None).unwrap()).unwrap();
        seed_demo_data(&repos, &hashing).await.unwrap();

        let alice = repos.users.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert!(hashing.verify(DEMO_PASSWORD, &alice.password_hash).unwrap());
    }
}

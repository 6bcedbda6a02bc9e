//! Shared harness: the full router over in-memory repositories.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Duration;

use argon2::Params;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use menu_reviews::auth::{PasswordHashing, TokenService};
use menu_reviews::db::Database;
use menu_reviews::gateway::{build_router, state::AppState};
use menu_reviews::repository::Repositories;
use menu_reviews::storage::{ObjectStorage, StorageError, StoredObject, UploadObject};

pub const SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "password123";
pub const BOUNDARY: &str = "menu-reviews-test-boundary";

/// Object storage that keeps uploads in memory.
#[derive(Default)]
pub struct MockStorage {
    pub uploaded: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for MockStorage {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn upload(&self, object: UploadObject) -> Result<StoredObject, StorageError> {
        let public_id = format!("{}/{}", object.folder, object.public_id);
        self.uploaded.lock().unwrap().push(public_id.clone());
        Ok(StoredObject {
            url: format!("https://cdn.example.com/{}.jpg", public_id),
            public_id,
        })
    }

    async fn delete(&self, _public_id: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenService>,
    pub storage: Arc<MockStorage>,
}

pub fn app() -> TestApp {
    build(true, None)
}

pub fn app_without_storage() -> TestApp {
    build(false, None)
}

/// In-memory repositories, but health pings the given database.
pub fn app_with_database(db: Database) -> TestApp {
    build(true, Some(Arc::new(db)))
}

fn build(with_storage: bool, pg_db: Option<Arc<Database>>) -> TestApp {
    let tokens = Arc::new(TokenService::new(SECRET, Duration::hours(1), Duration::days(7)));
    let hashing = Arc::new(PasswordHashing::new(Params::new(1024, 1, 1, None).unwrap()).unwrap());
    let mock = Arc::new(MockStorage::default());
    let storage = with_storage.then(|| {
        let storage: Arc<dyn ObjectStorage> = mock.clone();
        (storage, "test".to_string())
    });
    let state = AppState::new(Repositories::in_memory(), tokens.clone(), hashing, storage, pg_db);
    TestApp {
        router: build_router(Arc::new(state)),
        tokens,
        storage: mock,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    /// Register a user and return (access token, user id).
    pub async fn sign_up(&self, email: &str) -> (String, i64) {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/signup",
                None,
                Some(json!({ "email": email, "password": PASSWORD, "name": "Tester" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        (
            body["data"]["token"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_i64().unwrap(),
        )
    }

    /// Create a store and a menu item, returning the menu item id.
    pub async fn menu_item(&self, token: &str, store_name: &str) -> i64 {
        let (status, store) = self
            .request(
                Method::POST,
                "/api/v1/stores",
                Some(token),
                Some(json!({ "name": store_name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", store);
        let (status, item) = self
            .request(
                Method::POST,
                "/api/v1/menu-items",
                Some(token),
                Some(json!({
                    "store_id": store["data"]["id"],
                    "name": "Noodles",
                    "price": "9.50"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", item);
        item["data"]["id"].as_i64().unwrap()
    }

    pub async fn review(&self, token: &str, menu_item_id: i64, rating: i64) -> i64 {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/reviews",
                Some(token),
                Some(json!({ "menu_item_id": menu_item_id, "rating": rating, "title": "t" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }
}

/// multipart/form-data body with one `images` part per file.
pub fn multipart_body(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(uri: &str, token: &str, files: &[(&str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

mod common;

use axum::http::StatusCode;

use common::{app, app_without_storage, upload_request};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[tokio::test]
async fn upload_stores_images_for_owner() {
    let app = app();
    let (alice, _) = app.sign_up("alice@example.com").await;
    let item = app.menu_item(&alice, "Pho Corner").await;
    let review = app.review(&alice, item, 5).await;
    let uri = format!("/api/v1/reviews/{}/upload-images", review);

    let (status, body) = app
        .send(upload_request(&uri, &alice, &[("one.png", PNG), ("two.JPG", PNG)]))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let images = body["data"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["image_order"], 0);
    assert_eq!(images[1]["image_order"], 1);
    assert!(images[0]["image_url"].as_str().unwrap().starts_with("https://cdn.example.com/"));
    assert_eq!(app.storage.uploaded.lock().unwrap().len(), 2);

    // A second batch continues the order
    let (status, body) = app.send(upload_request(&uri, &alice, &[("three.gif", PNG)])).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["image_order"], 2);
}

#[tokio::test]
async fn upload_rejects_bad_files() {
    let app = app();
    let (alice, _) = app.sign_up("alice@example.com").await;
    let item = app.menu_item(&alice, "Pho Corner").await;
    let review = app.review(&alice, item, 5).await;
    let uri = format!("/api/v1/reviews/{}/upload-images", review);

    let (status, _) = app.send(upload_request(&uri, &alice, &[("notes.txt", PNG)])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(upload_request(&uri, &alice, &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let files: Vec<(String, &[u8])> = (0..11).map(|i| (format!("{}.png", i), PNG)).collect();
    let refs: Vec<(&str, &[u8])> = files.iter().map(|(n, b)| (n.as_str(), *b)).collect();
    let (status, _) = app.send(upload_request(&uri, &alice, &refs)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.storage.uploaded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_by_non_owner_is_forbidden() {
    let app = app();
    let (alice, _) = app.sign_up("alice@example.com").await;
    let (bob, _) = app.sign_up("bob@example.com").await;
    let item = app.menu_item(&alice, "Pho Corner").await;
    let review = app.review(&alice, item, 5).await;
    let uri = format!("/api/v1/reviews/{}/upload-images", review);

    let (status, _) = app.send(upload_request(&uri, &bob, &[("one.png", PNG)])).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.storage.uploaded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_without_storage_is_unavailable() {
    let app = app_without_storage();
    let (alice, _) = app.sign_up("alice@example.com").await;
    let item = app.menu_item(&alice, "Pho Corner").await;
    let review = app.review(&alice, item, 5).await;
    let uri = format!("/api/v1/reviews/{}/upload-images", review);

    let (status, body) = app.send(upload_request(&uri, &alice, &[("one.png", PNG)])).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service temporarily unavailable");
}

mod common;

use axum::http::{Method, Request, StatusCode, header};
use axum::body::Body;
use serde_json::json;

use common::{PASSWORD, app};

#[tokio::test]
async fn signin_issues_fresh_valid_token() {
    let app = app();
    let (t1, user_id) = app.sign_up("alice@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/signin",
            None,
            Some(json!({ "email": "alice@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let t2 = body["data"]["token"]["access_token"].as_str().unwrap();
    assert_ne!(t1, t2, "each sign-in issues a new token");
    assert_eq!(body["data"]["token"]["token_type"], "Bearer");

    let identity = app.tokens.validate(t2).unwrap();
    assert_eq!(identity.user_id, user_id);
    assert_eq!(identity.email, "alice@example.com");
}

#[tokio::test]
async fn signup_rejects_duplicate_email_case_insensitively() {
    let app = app();
    app.sign_up("bob@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({ "email": "  BOB@Example.com", "password": PASSWORD, "name": "Bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is already registered");
}

#[tokio::test]
async fn signup_validates_input() {
    let app = app();
    for payload in [
        json!({ "email": "not-an-email", "password": PASSWORD, "name": "X" }),
        json!({ "email": "x@example.com", "password": "short", "name": "X" }),
        json!({ "email": "x@example.com", "password": PASSWORD, "name": "" }),
        json!({ "email": "x@example.com" }),
    ] {
        let (status, body) = app
            .request(Method::POST, "/api/v1/auth/signup", None, Some(payload))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn signin_failures_are_indistinguishable() {
    let app = app();
    app.sign_up("carol@example.com").await;

    let (wrong_status, wrong_body) = app
        .request(
            Method::POST,
            "/api/v1/auth/signin",
            None,
            Some(json!({ "email": "carol@example.com", "password": "wrong-password" })),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .request(
            Method::POST,
            "/api/v1/auth/signin",
            None,
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn me_requires_valid_bearer_token() {
    let app = app();
    let (token, user_id) = app.sign_up("dave@example.com").await;

    let (status, _) = app.get("/api/v1/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for value in [
        format!("Basic {}", token),
        format!("bearer {}", token),
        "Bearer ".to_string(),
        format!("Bearer {}x", token),
    ] {
        let request = Request::builder()
            .uri("/api/v1/auth/me")
            .header(header::AUTHORIZATION, value.clone())
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "accepted {:?}", value);
        assert!(body["error"].is_string());
    }

    let (status, body) = app
        .request(Method::GET, "/api/v1/auth/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user_id);
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn refresh_accepts_only_refresh_tokens() {
    let app = app();
    let (_, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({ "email": "erin@example.com", "password": PASSWORD, "name": "Erin" })),
        )
        .await;
    let access = body["data"]["token"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["token"]["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"]["access_token"].is_string());

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": access })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A refresh token is not an access token
    let (status, _) = app
        .request(Method::GET, "/api/v1/auth/me", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn writes_require_auth_reads_do_not() {
    let app = app();
    let (status, _) = app
        .request(Method::POST, "/api/v1/stores", None, Some(json!({ "name": "S" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/v1/stores").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    for uri in ["/health", "/api/v1/health"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }
}

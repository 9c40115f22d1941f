mod common;

use reqwest::StatusCode;
use serde_json::json;

use roleplay_accounts::password;
use roleplay_accounts::store::AccountStore;

// ── Create ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_user() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .post_json(
            "/users",
            &json!({
                "email": "u@example.com",
                "username": "player_one",
                "password": "secret",
                "avatar": "https://images.example.com/a.png"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "u@example.com");
    assert_eq!(body["user"]["username"], "player_one");
    assert_eq!(body["user"]["avatar"], "https://images.example.com/a.png");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn create_user_hashes_password() {
    let app = common::spawn_app().await;

    let (body, _) = app
        .post_json(
            "/users",
            &json!({ "email": "u@example.com", "username": "player_one", "password": "secret" }),
        )
        .await;

    let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
    let stored = app
        .store
        .find_user_by_id(id)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "secret");
    assert!(password::verify("secret", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn create_user_duplicate_email() {
    let app = common::spawn_app().await;
    app.create_user("u@example.com", "player_one", "secret").await;

    let (body, status) = app
        .post_json(
            "/users",
            &json!({ "email": "u@example.com", "username": "player_two", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["status"], 409);
    assert_eq!(body["message"], "email already in use");
}

#[tokio::test]
async fn create_user_duplicate_username() {
    let app = common::spawn_app().await;
    app.create_user("u@example.com", "player_one", "secret").await;

    let (body, status) = app
        .post_json(
            "/users",
            &json!({ "email": "v@example.com", "username": "player_one", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "username already in use");
}

#[tokio::test]
async fn create_user_rejects_missing_data() {
    let app = common::spawn_app().await;

    let (body, status) = app.post_json("/users", &json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["status"], 422);

    let (_, status) = app
        .post_json(
            "/users",
            &json!({ "email": "bad", "username": "player_one", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, status) = app
        .post_json(
            "/users",
            &json!({ "email": "u@example.com", "username": "player_one", "password": "abc" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ── Update ──────────────────────────────────────────────────────

#[tokio::test]
async fn update_user() {
    let app = common::spawn_app().await;
    let user = app.create_user("u@example.com", "player_one", "secret").await;

    let (body, status) = app
        .put_json(
            &format!("/users/{}", user.id),
            &json!({
                "email": "new@example.com",
                "password": "new-secret",
                "avatar": "https://images.example.com/b.png"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "new@example.com");
    assert_eq!(body["user"]["avatar"], "https://images.example.com/b.png");
    assert_eq!(body["user"]["username"], "player_one");

    let user = app.reload(&user).await;
    assert!(password::verify("new-secret", &user.password_hash).unwrap());
}

#[tokio::test]
async fn update_user_partial_keeps_other_fields() {
    let app = common::spawn_app().await;
    let user = app.create_user("u@example.com", "player_one", "secret").await;

    let (body, status) = app
        .put_json(
            &format!("/users/{}", user.id),
            &json!({ "avatar": "https://images.example.com/c.png" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "u@example.com");

    let user = app.reload(&user).await;
    assert!(password::verify("secret", &user.password_hash).unwrap());
}

#[tokio::test]
async fn update_user_not_found() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .put_json(
            "/users/0192e1c4-0000-7000-8000-000000000000",
            &json!({ "avatar": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (_, status) = app.put_json("/users/not-a-uuid", &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_user_email_taken() {
    let app = common::spawn_app().await;
    app.create_user("u@example.com", "player_one", "secret").await;
    let other = app.create_user("v@example.com", "player_two", "secret").await;

    let (body, status) = app
        .put_json(
            &format!("/users/{}", other.id),
            &json!({ "email": "u@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email already in use");

    // Re-submitting your own email is not a conflict
    let (_, status) = app
        .put_json(
            &format!("/users/{}", other.id),
            &json!({ "email": "v@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_user_rejects_invalid_fields() {
    let app = common::spawn_app().await;
    let user = app.create_user("u@example.com", "player_one", "secret").await;

    let (_, status) = app
        .put_json(&format!("/users/{}", user.id), &json!({ "email": "nope" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, status) = app
        .put_json(&format!("/users/{}", user.id), &json!({ "password": "ab" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

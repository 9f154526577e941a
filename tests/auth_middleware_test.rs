//! Integration tests for cookie authentication on protected routes.
//!
//! `GET /auth/me` doubles as the probe: it sits behind the same middleware
//! as every other protected route.

mod common;

use axum::http::{Method, StatusCode};
use common::{empty_request, read_json, with_cookies, TestApp};

const EMAIL: &str = "ivan@example.com";
const PASSWORD: &str = "password123";

#[tokio::test]
async fn protected_route_requires_a_cookie() {
    let app = TestApp::spawn().await;

    let response = app
        .request(empty_request(Method::GET, "/api/v1/auth/me"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Unauthorized");

    app.cleanup().await;
}

#[tokio::test]
async fn garbage_access_token_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .request(with_cookies(
            empty_request(Method::GET, "/api/v1/auth/me"),
            "accessToken=not-a-jwt",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    app.cleanup().await;
}

#[tokio::test]
async fn me_returns_the_sanitized_profile() {
    let app = TestApp::spawn().await;
    app.seed_user(EMAIL, PASSWORD).await;
    let cookies = app.sign_in(EMAIL, PASSWORD).await;

    let response = app
        .request(with_cookies(
            empty_request(Method::GET, "/api/v1/auth/me"),
            &cookies,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Получена информация о пользователе");
    assert_eq!(body["data"]["email"], EMAIL);
    assert_eq!(body["data"]["firstName"], "Иван");
    assert_eq!(body["data"]["roles"], serde_json::json!(["USER"]));
    assert!(
        body["data"].get("passwordHash").is_none(),
        "password hash must never leave the service"
    );

    app.cleanup().await;
}

#[tokio::test]
async fn stale_roles_invalidate_the_token() {
    let app = TestApp::spawn().await;
    let user = app.seed_user(EMAIL, PASSWORD).await;
    let cookies = app.sign_in(EMAIL, PASSWORD).await;

    // The role set changed after the token was minted
    app.promote_to_admin(user.id).await;

    let response = app
        .request(with_cookies(
            empty_request(Method::GET, "/api/v1/auth/me"),
            &cookies,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Устаревшие роли");

    app.cleanup().await;
}

#[tokio::test]
async fn token_for_a_deleted_user_is_not_found() {
    let app = TestApp::spawn().await;
    let user = app.seed_user(EMAIL, PASSWORD).await;
    let cookies = app.sign_in(EMAIL, PASSWORD).await;

    app.delete_user(user.id).await;

    let response = app
        .request(with_cookies(
            empty_request(Method::GET, "/api/v1/auth/me"),
            &cookies,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Пользователь не найден");

    app.cleanup().await;
}

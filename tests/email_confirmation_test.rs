//! Integration tests for email confirmation.
//!
//! Covers the mailed link, both consumption routes, the re-issue window
//! and the attempt counter.

mod common;

use axum::http::{Method, StatusCode};
use common::{empty_request, json_request, read_json, token_from_link, TestApp};
use serde_json::json;
use skillbridge_auth::models::ConfirmKind;

const EMAIL: &str = "unconfirmed@example.com";
const PASSWORD: &str = "password123";

async fn request_link(app: &TestApp) -> String {
    let response = app
        .request(empty_request(
            Method::POST,
            &format!("/api/v1/email-confirmation/resend?email={}", EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK, "resend must succeed");
    token_from_link(&app.email.last_sent().expect("link must be mailed").body)
}

// ============================================================================
// Confirmation
// ============================================================================

#[tokio::test]
async fn mailed_link_confirms_the_email() {
    let app = TestApp::spawn().await;
    let user = app.seed_unconfirmed_user(EMAIL, PASSWORD).await;
    let token = request_link(&app).await;

    let response = app
        .request(empty_request(
            Method::GET,
            &format!("/api/v1/auth/confirm-email?token={}&email={}", token, EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Email подтвержден");
    assert_eq!(body["data"]["email"], EMAIL);

    assert!(app.reload_user(user.id).await.email_confirmed);
    // The link is single-use
    assert!(app.confirm_artifact(user.id, ConfirmKind::Mail).await.is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn json_body_confirmation_works() {
    let app = TestApp::spawn().await;
    let user = app.seed_unconfirmed_user(EMAIL, PASSWORD).await;
    let token = request_link(&app).await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/email-confirmation",
            json!({ "token": token, "email": EMAIL }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(app.reload_user(user.id).await.email_confirmed);

    app.cleanup().await;
}

#[tokio::test]
async fn auth_prefixed_resend_alias_works() {
    let app = TestApp::spawn().await;
    app.seed_unconfirmed_user(EMAIL, PASSWORD).await;

    let response = app
        .request(empty_request(
            Method::POST,
            &format!("/api/v1/auth/resend-confirm-email?email={}", EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(
        body["message"],
        "Вам нужно перейти по ссылке, чтобы подтвердить электронную почту. Ссылка действительна 15 минут. Она уже отправлена на вашу почту"
    );
    assert!(app.email.last_sent().is_some());

    app.cleanup().await;
}

// ============================================================================
// Re-issue window
// ============================================================================

#[tokio::test]
async fn resend_is_blocked_while_the_link_is_live() {
    let app = TestApp::spawn().await;
    app.seed_unconfirmed_user(EMAIL, PASSWORD).await;
    request_link(&app).await;

    let response = app
        .request(empty_request(
            Method::POST,
            &format!("/api/v1/email-confirmation/resend?email={}", EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(
        message.starts_with("Подтверждение почты уже отправлено"),
        "unexpected message: {}",
        message
    );
    assert_eq!(app.email.sent().len(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn resend_inside_the_final_window_issues_a_fresh_link() {
    let app = TestApp::spawn().await;
    let user = app.seed_unconfirmed_user(EMAIL, PASSWORD).await;
    let first_token = request_link(&app).await;

    // Push the live link into its final 30 seconds
    app.set_confirm_expiry(user.id, ConfirmKind::Mail, 10).await;

    let second_token = request_link(&app).await;
    assert_ne!(first_token, second_token);
    assert_eq!(app.email.sent().len(), 2);

    app.cleanup().await;
}

// ============================================================================
// Rejection
// ============================================================================

#[tokio::test]
async fn expired_link_is_rejected_and_destroyed() {
    let app = TestApp::spawn().await;
    let user = app.seed_unconfirmed_user(EMAIL, PASSWORD).await;
    let token = request_link(&app).await;
    app.set_confirm_expiry(user.id, ConfirmKind::Mail, -5).await;

    let response = app
        .request(empty_request(
            Method::GET,
            &format!("/api/v1/auth/confirm-email?token={}&email={}", token, EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Срок действия кода истек");

    assert!(!app.reload_user(user.id).await.email_confirmed);
    assert!(app.confirm_artifact(user.id, ConfirmKind::Mail).await.is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn wrong_token_burns_an_attempt_but_the_link_survives() {
    let app = TestApp::spawn().await;
    let user = app.seed_unconfirmed_user(EMAIL, PASSWORD).await;
    let token = request_link(&app).await;
    let wrong = "deadbeef".repeat(8);

    let response = app
        .request(empty_request(
            Method::GET,
            &format!("/api/v1/auth/confirm-email?token={}&email={}", wrong, EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Неверный код подтверждения. Осталось попыток: 2");

    // The real link still works
    let response = app
        .request(empty_request(
            Method::GET,
            &format!("/api/v1/auth/confirm-email?token={}&email={}", token, EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.reload_user(user.id).await.email_confirmed);

    app.cleanup().await;
}

#[tokio::test]
async fn already_confirmed_email_cannot_be_resent() {
    let app = TestApp::spawn().await;
    app.seed_user(EMAIL, PASSWORD).await;

    let response = app
        .request(empty_request(
            Method::POST,
            &format!("/api/v1/email-confirmation/resend?email={}", EMAIL),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Почта уже подтверждена");

    app.cleanup().await;
}

#[tokio::test]
async fn resend_for_an_unknown_email_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .request(empty_request(
            Method::POST,
            "/api/v1/email-confirmation/resend?email=nobody@example.com",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Пользователь не найден");

    app.cleanup().await;
}

#[tokio::test]
async fn confirmation_for_an_unknown_email_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .request(empty_request(
            Method::GET,
            &format!(
                "/api/v1/auth/confirm-email?token={}&email=nobody@example.com",
                "deadbeef".repeat(8)
            ),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Код не найден");

    app.cleanup().await;
}

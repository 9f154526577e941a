//! Integration tests for sign-in with email and with phone.
//!
//! Covers cookie issuance, credential rejection, the client-info
//! requirement, the unconfirmed-email interception and refresh-session
//! replacement for a returning client.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{
    cookie_from_header, json_request, json_request_without_user_agent, read_json,
    session_cookies, TestApp,
};
use serde_json::json;

// ============================================================================
// Email sign-in
// ============================================================================

#[tokio::test]
async fn sign_in_sets_session_cookies() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("ivan@example.com", "password123").await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            json!({ "email": "ivan@example.com", "password": "password123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2, "both session cookies must be set");
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
    assert!(
        cookies.iter().all(|c| c.contains("HttpOnly")),
        "session cookies must be HttpOnly: {:?}",
        cookies
    );

    let body = read_json(response).await;
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["message"], "Авторизация успешна");
    assert_eq!(body["data"]["email"], "ivan@example.com");
    assert_eq!(body["data"]["firstName"], "Иван");
    assert!(
        body["data"].get("passwordHash").is_none(),
        "password hash must never leave the service"
    );

    assert_eq!(app.refresh_session_count(user.id).await, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn sign_in_rejects_wrong_password() {
    let app = TestApp::spawn().await;
    app.seed_user("ivan@example.com", "password123").await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            json!({ "email": "ivan@example.com", "password": "wrong-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Неверные данные для входа");

    app.cleanup().await;
}

#[tokio::test]
async fn sign_in_rejects_unknown_email() {
    let app = TestApp::spawn().await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            json!({ "email": "nobody@example.com", "password": "password123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Same message as a wrong password, so the response does not reveal
    // which accounts exist
    let body = read_json(response).await;
    assert_eq!(body["message"], "Неверные данные для входа");

    app.cleanup().await;
}

#[tokio::test]
async fn sign_in_requires_a_user_agent() {
    let app = TestApp::spawn().await;
    app.seed_user("ivan@example.com", "password123").await;

    let response = app
        .request(json_request_without_user_agent(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            json!({ "email": "ivan@example.com", "password": "password123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Ip (и) или userAgent не указан(ы)");

    app.cleanup().await;
}

#[tokio::test]
async fn password_is_checked_before_client_info() {
    let app = TestApp::spawn().await;
    app.seed_user("ivan@example.com", "password123").await;

    let response = app
        .request(json_request_without_user_agent(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            json!({ "email": "ivan@example.com", "password": "wrong-password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Неверные данные для входа");

    app.cleanup().await;
}

// ============================================================================
// Phone sign-in
// ============================================================================

#[tokio::test]
async fn sign_in_with_phone_works() {
    let app = TestApp::spawn().await;
    let user = app
        .seed_phone_user("ivan@example.com", "+79991234567", "password123")
        .await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-phone",
            json!({ "phone": "+79991234567", "password": "password123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = session_cookies(&response);
    assert!(cookie_from_header(&cookies, "accessToken").is_some());
    assert!(cookie_from_header(&cookies, "refreshToken").is_some());
    assert_eq!(app.refresh_session_count(user.id).await, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn sign_in_with_unknown_phone_fails() {
    let app = TestApp::spawn().await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-phone",
            json!({ "phone": "+79990000000", "password": "password123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Неверные данные для входа");

    app.cleanup().await;
}

// ============================================================================
// Unconfirmed email interception
// ============================================================================

#[tokio::test]
async fn unconfirmed_account_gets_a_confirmation_mail_instead_of_a_session() {
    let app = TestApp::spawn().await;
    app.seed_unconfirmed_user("fresh@example.com", "password123")
        .await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            json!({ "email": "fresh@example.com", "password": "password123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get_all(header::SET_COOKIE).iter().count(),
        0,
        "no session may be issued before the email is confirmed"
    );

    let body = read_json(response).await;
    assert_eq!(
        body["message"],
        "Вам нужно перейти по ссылке, чтобы подтвердить электронную почту. Ссылка действительна 15 минут. Она уже отправлена на вашу почту"
    );
    assert!(body["data"]["mailConfirmCodeExpiresAt"].is_string());

    let mail = app.email.last_sent().expect("confirmation mail must go out");
    assert_eq!(mail.to, "fresh@example.com");
    assert!(mail.body.contains("/auth/confirm-email?token="));

    app.cleanup().await;
}

#[tokio::test]
async fn sign_in_right_after_sign_up_hits_the_reissue_window() {
    let app = TestApp::spawn().await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-up",
            json!({
                "email": "fresh@example.com",
                "password": "password123",
                "firstName": "Пётр",
                "lastName": "Смирнов"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The sign-up link is still live, so the interception cannot mail
    // another one yet
    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            json!({ "email": "fresh@example.com", "password": "password123" }),
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

    app.cleanup().await;
}

// ============================================================================
// Session replacement
// ============================================================================

#[tokio::test]
async fn returning_client_replaces_its_refresh_session() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("ivan@example.com", "password123").await;

    app.sign_in("ivan@example.com", "password123").await;
    app.sign_in("ivan@example.com", "password123").await;

    // Same ip and user agent: the first session is evicted, not stacked
    assert_eq!(app.refresh_session_count(user.id).await, 1);

    app.cleanup().await;
}

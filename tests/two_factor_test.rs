//! Integration tests for mail-based two-factor sign-in.
//!
//! The first credential check mails a 6-digit code; the session is only
//! issued once that code comes back. Wrong codes burn attempts, the third
//! one destroys the code.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{json_request, read_json, TestApp};
use serde_json::json;
use skillbridge_auth::models::ConfirmKind;

const EMAIL: &str = "twofactor@example.com";
const PASSWORD: &str = "password123";

fn sign_in_body(code: Option<&str>) -> serde_json::Value {
    match code {
        Some(code) => json!({
            "email": EMAIL,
            "password": PASSWORD,
            "twoFactorMailAuthCode": code
        }),
        None => json!({ "email": EMAIL, "password": PASSWORD }),
    }
}

/// A syntactically valid code guaranteed to differ from the mailed one.
fn wrong_code(code: &str) -> String {
    if code.starts_with('1') {
        format!("2{}", &code[1..])
    } else {
        format!("1{}", &code[1..])
    }
}

async fn mailed_code(app: &TestApp) -> String {
    let mail = app.email.last_sent().expect("two-factor mail must go out");
    assert_eq!(mail.subject, "Код двухфакторной аутентификации");
    mail.body
}

// ============================================================================
// Code issuance
// ============================================================================

#[tokio::test]
async fn two_factor_sign_in_mails_a_code_first() {
    let app = TestApp::spawn().await;
    app.seed_two_factor_user(EMAIL, PASSWORD).await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(None),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get_all(header::SET_COOKIE).iter().count(),
        0,
        "no session may be issued before the code comes back"
    );

    let body = read_json(response).await;
    assert_eq!(body["message"], "Код отправлен");

    let code = mailed_code(&app).await;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    app.cleanup().await;
}

#[tokio::test]
async fn empty_code_field_counts_as_absent() {
    let app = TestApp::spawn().await;
    app.seed_two_factor_user(EMAIL, PASSWORD).await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(Some("")),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Код отправлен");

    app.cleanup().await;
}

#[tokio::test]
async fn second_sign_in_without_code_is_blocked_while_the_code_lives() {
    let app = TestApp::spawn().await;
    app.seed_two_factor_user(EMAIL, PASSWORD).await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(None),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(None),
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
    assert_eq!(app.email.sent().len(), 1, "no second code may be mailed");

    app.cleanup().await;
}

// ============================================================================
// Code validation
// ============================================================================

#[tokio::test]
async fn mailed_code_completes_the_sign_in() {
    let app = TestApp::spawn().await;
    let user = app.seed_two_factor_user(EMAIL, PASSWORD).await;

    app.request(json_request(
        Method::POST,
        "/api/v1/auth/sign-in-with-email",
        sign_in_body(None),
    ))
    .await;
    let code = mailed_code(&app).await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(Some(&code)),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));

    // The code is single-use
    assert!(app
        .confirm_artifact(user.id, ConfirmKind::TwoFactorMail)
        .await
        .is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn wrong_code_counts_down_and_the_third_destroys_it() {
    let app = TestApp::spawn().await;
    app.seed_two_factor_user(EMAIL, PASSWORD).await;

    app.request(json_request(
        Method::POST,
        "/api/v1/auth/sign-in-with-email",
        sign_in_body(None),
    ))
    .await;
    let code = mailed_code(&app).await;
    let wrong = wrong_code(&code);

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(Some(&wrong)),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Неверный код подтверждения. Осталось попыток: 2");

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(Some(&wrong)),
        ))
        .await;
    let body = read_json(response).await;
    assert_eq!(body["message"], "Неверный код подтверждения. Осталось попыток: 1");

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(Some(&wrong)),
        ))
        .await;
    let body = read_json(response).await;
    assert_eq!(body["message"], "Превышено количество попыток");

    // Even the real code is useless now
    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(Some(&code)),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Код не найден");

    app.cleanup().await;
}

#[tokio::test]
async fn expired_code_is_rejected_and_destroyed() {
    let app = TestApp::spawn().await;
    let user = app.seed_two_factor_user(EMAIL, PASSWORD).await;

    app.request(json_request(
        Method::POST,
        "/api/v1/auth/sign-in-with-email",
        sign_in_body(None),
    ))
    .await;
    let code = mailed_code(&app).await;
    app.set_confirm_expiry(user.id, ConfirmKind::TwoFactorMail, -5)
        .await;

    let response = app
        .request(json_request(
            Method::POST,
            "/api/v1/auth/sign-in-with-email",
            sign_in_body(Some(&code)),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Срок действия кода истек");
    assert!(app
        .confirm_artifact(user.id, ConfirmKind::TwoFactorMail)
        .await
        .is_none());

    app.cleanup().await;
}

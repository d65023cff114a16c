mod common;

use axum::http::StatusCode;
use ratna_api::entity::sea_orm_active_enums::UserRole;
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn signup_issues_token_and_rejects_duplicates() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/auth/signup",
            None,
            json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "customer");

    let token = body["token"].as_str().expect("token in response");
    let claims = ratna_api::token::verify("test-secret", token).expect("valid token");
    assert_eq!(claims.sub, body["user"]["id"].as_str().unwrap());
    assert_eq!(claims.role, UserRole::Customer);

    // same email, different case
    let (status, body) = app
        .post(
            "/auth/signup",
            None,
            json!({"name": "Asha", "email": "ASHA@Example.COM", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn signup_rejects_weak_password() {
    let app = spawn_app().await;
    let (status, _) = app
        .post(
            "/auth/signup",
            None,
            json!({"name": "A", "email": "a@example.com", "password": "short"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_gives_identical_error_for_unknown_email_and_wrong_password() {
    let app = spawn_app().await;
    app.post(
        "/auth/signup",
        None,
        json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"}),
    )
    .await;

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "asha@example.com", "password": "wrong!!"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password_message = body["message"].clone();

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "nobody@example.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], wrong_password_message);

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "asha@example.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

fn extract_otp(text: &str) -> String {
    // mail body carries "Your password reset code is: NNNNNN"
    let marker = "code is: ";
    let start = text.find(marker).expect("otp marker in mail") + marker.len();
    text[start..start + 6].to_string()
}

#[tokio::test]
async fn forgot_password_is_silent_about_unknown_emails() {
    let app = spawn_app().await;
    app.post(
        "/auth/signup",
        None,
        json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"}),
    )
    .await;

    let (status, known) = app
        .post("/auth/forgot-password", None, json!({"email": "asha@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, unknown) = app
        .post("/auth/forgot-password", None, json!({"email": "nobody@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(known["message"], unknown["message"]);

    // only the real account got a mail
    assert_eq!(app.mail.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn reset_password_succeeds_exactly_once() {
    let app = spawn_app().await;
    app.post(
        "/auth/signup",
        None,
        json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"}),
    )
    .await;
    app.post("/auth/forgot-password", None, json!({"email": "asha@example.com"}))
        .await;

    let otp = {
        let sent = app.mail.sent.lock().unwrap();
        extract_otp(sent[0].body_text.as_deref().expect("text body"))
    };

    let (status, _) = app
        .post(
            "/auth/reset-password",
            None,
            json!({"email": "asha@example.com", "otp": otp, "newPassword": "newpass1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // old password no longer works, new one does
    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "asha@example.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "asha@example.com", "password": "newpass1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // replaying the consumed code fails
    let (status, body) = app
        .post(
            "/auth/reset-password",
            None,
            json!({"email": "asha@example.com", "otp": otp, "newPassword": "another1"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired code");
}

#[tokio::test]
async fn reset_password_rejects_wrong_code() {
    let app = spawn_app().await;
    app.post(
        "/auth/signup",
        None,
        json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"}),
    )
    .await;
    app.post("/auth/forgot-password", None, json!({"email": "asha@example.com"}))
        .await;

    let real_otp = {
        let sent = app.mail.sent.lock().unwrap();
        extract_otp(sent[0].body_text.as_deref().unwrap())
    };
    let wrong_otp = if real_otp == "000000" { "111111" } else { "000000" };

    let (status, _) = app
        .post(
            "/auth/reset-password",
            None,
            json!({"email": "asha@example.com", "otp": wrong_otp, "newPassword": "newpass1"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_a_valid_token() {
    let app = spawn_app().await;

    let (status, _) = app.get("/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/auth/me", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, token) = app
        .seed_user("Asha", "asha@example.com", UserRole::Customer)
        .await;
    let (status, body) = app.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "asha@example.com");
}

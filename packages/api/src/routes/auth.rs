use axum::extract::State;
use axum::{Extension, Json, Router, routing::get, routing::post};
use chrono::{Duration, Utc};
use hyper::StatusCode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

use crate::config::OTP_TTL_MINUTES;
use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::user;
use crate::error::ApiError;
use crate::ids::new_id;
use crate::mail::{EmailMessage, templates};
use crate::middleware::jwt::AppUser;
use crate::state::AppState;
use crate::{otp, password};

use super::users::UserProfile;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_password_strength(password: &str) -> Result<(), ApiError> {
    if password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Self-service signup always creates a customer. Seller and marketer
/// accounts are provisioned by an admin.
#[tracing::instrument(name = "POST /auth/signup", skip(state, payload))]
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::bad_request("Name and email are required"));
    }
    check_password_strength(&payload.password)?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let now = Utc::now().naive_utc();
    let created = user::ActiveModel {
        id: Set(new_id()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(password::hash(&payload.password)?),
        role: Set(UserRole::Customer),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let token = state.issue_token(&created)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserProfile::from(created),
        }),
    ))
}

/// Failed lookups and failed password checks answer identically so the
/// endpoint cannot be used to probe which emails exist.
#[tracing::instrument(name = "POST /auth/login", skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(&payload.email);

    let Some(found) = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
    else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !password::verify(&payload.password, &found.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.issue_token(&found)?;
    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(found),
    }))
}

/// The response never reveals whether the address is registered.
#[tracing::instrument(name = "POST /auth/forgot-password", skip(state, payload))]
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = normalize_email(&payload.email);
    let neutral = MessageResponse {
        message: "If that email exists, a reset code has been sent".to_string(),
    };

    let Some(found) = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
    else {
        return Ok(Json(neutral));
    };

    let code = otp::generate();
    let expires = Utc::now().naive_utc() + Duration::minutes(OTP_TTL_MINUTES);

    let name = found.name.clone();
    let mut active = found.into_active_model();
    active.reset_otp_hash = Set(Some(otp::hash(&code)));
    active.reset_otp_expires_at = Set(Some(expires));
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    // The code is already stored at this point. A delivery failure is
    // surfaced so the user does not wait on a mail that never left.
    let Some(mail_client) = &state.mail_client else {
        return Err(ApiError::upstream("Failed to send reset code"));
    };
    let (html, text) = templates::password_reset_otp(&name, &code);
    let message = EmailMessage {
        to: email,
        subject: "Your password reset code".to_string(),
        body_html: Some(html),
        body_text: Some(text),
    };
    if let Err(err) = mail_client.send(message).await {
        tracing::error!("Failed to send password reset mail: {}", err);
        return Err(ApiError::upstream("Failed to send reset code"));
    }

    Ok(Json(neutral))
}

/// Every failure mode answers the same 400 so the endpoint leaks nothing
/// about which part was wrong.
#[tracing::instrument(name = "POST /auth/reset-password", skip(state, payload))]
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    check_password_strength(&payload.new_password)?;
    let email = normalize_email(&payload.email);
    let rejected = || ApiError::bad_request("Invalid or expired code");

    let found = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(rejected)?;

    let stored_hash = found.reset_otp_hash.clone().ok_or_else(rejected)?;
    let expires_at = found.reset_otp_expires_at.ok_or_else(rejected)?;
    if expires_at < Utc::now().naive_utc() {
        return Err(rejected());
    }
    if !otp::matches(&payload.otp, &stored_hash) {
        return Err(rejected());
    }

    let mut active = found.into_active_model();
    active.password_hash = Set(password::hash(&payload.new_password)?);
    active.reset_otp_hash = Set(None);
    active.reset_otp_expires_at = Set(None);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

#[tracing::instrument(name = "GET /auth/me", skip(state, user))]
async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let current = user.get_user(&state).await?;
    Ok(Json(UserProfile::from(current)))
}

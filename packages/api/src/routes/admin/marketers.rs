use axum::extract::{Path, State};
use axum::{
    Extension, Json, Router,
    routing::{get, patch, post, put},
};
use chrono::Utc;
use hyper::StatusCode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::commissions::{WeeklySummary, aggregate_weeks};
use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::{commission, coupon, user};
use crate::error::ApiError;
use crate::ids::new_id;
use crate::middleware::jwt::AppUser;
use crate::password;
use crate::routes::marketers::{MarketerStats, stats_from};
use crate::routes::users::UserProfile;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/marketers", get(list_marketers).post(create_marketer))
        .route(
            "/marketers/{marketer_id}",
            put(update_marketer).delete(delete_marketer),
        )
        .route("/marketers/{marketer_id}/coupons", post(add_coupon))
        .route(
            "/marketers/{marketer_id}/commissions",
            get(marketer_commissions),
        )
        .route("/coupons/{coupon_id}/toggle", patch(toggle_coupon))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketerOverview {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub coupons: Vec<coupon::Model>,
    pub stats: MarketerStats,
}

#[tracing::instrument(name = "GET /admin/marketers", skip(state, user))]
async fn list_marketers(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<Vec<MarketerOverview>>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let marketers = User::find()
        .filter(user::Column::Role.eq(UserRole::Marketer))
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut overviews = Vec::with_capacity(marketers.len());
    for marketer in marketers {
        let coupons = Coupon::find()
            .filter(coupon::Column::MarketerId.eq(&marketer.id))
            .all(&state.db)
            .await?;
        let rows = Commission::find()
            .filter(commission::Column::MarketerId.eq(&marketer.id))
            .all(&state.db)
            .await?;
        overviews.push(MarketerOverview {
            profile: UserProfile::from(marketer),
            coupons,
            stats: stats_from(&rows),
        });
    }
    Ok(Json(overviews))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarketer {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub coupon_code: String,
    pub commission_rate: f64,
}

fn check_rate(rate: f64) -> Result<(), ApiError> {
    if !(0.0..=100.0).contains(&rate) {
        return Err(ApiError::bad_request(
            "Commission rate must be between 0 and 100",
        ));
    }
    Ok(())
}

async fn check_code_free(state: &AppState, code: &str) -> Result<(), ApiError> {
    let taken = Coupon::find()
        .filter(coupon::Column::Code.eq(code))
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(ApiError::conflict("Coupon code already in use"));
    }
    Ok(())
}

/// A marketer is created together with their first coupon; both the email
/// and the coupon code must be free before anything is written.
#[tracing::instrument(name = "POST /admin/marketers", skip(state, user, payload))]
async fn create_marketer(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<CreateMarketer>,
) -> Result<(StatusCode, Json<MarketerOverview>), ApiError> {
    user.require_role(UserRole::Admin)?;

    let email = payload.email.trim().to_lowercase();
    let code = payload.coupon_code.trim().to_uppercase();
    if payload.name.trim().is_empty() || email.is_empty() || code.is_empty() {
        return Err(ApiError::bad_request(
            "Name, email and coupon code are required",
        ));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }
    check_rate(payload.commission_rate)?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }
    check_code_free(&state, &code).await?;

    let now = Utc::now().naive_utc();
    let created = user::ActiveModel {
        id: Set(new_id()),
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password::hash(&payload.password)?),
        role: Set(UserRole::Marketer),
        phone: Set(payload.phone),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let first_coupon = coupon::ActiveModel {
        id: Set(new_id()),
        code: Set(code),
        marketer_id: Set(created.id.clone()),
        commission_rate: Set(payload.commission_rate),
        is_active: Set(true),
        usage_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MarketerOverview {
            profile: UserProfile::from(created),
            coupons: vec![first_coupon],
            stats: stats_from(&[]),
        }),
    ))
}

async fn load_marketer(state: &AppState, marketer_id: &str) -> Result<user::Model, ApiError> {
    let found = User::find_by_id(marketer_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Marketer not found"))?;
    if found.role != UserRole::Marketer {
        return Err(ApiError::not_found("Marketer not found"));
    }
    Ok(found)
}

#[derive(Debug, Deserialize)]
pub struct UpdateMarketer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[tracing::instrument(name = "PUT /admin/marketers/{id}", skip(state, user, payload))]
async fn update_marketer(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(marketer_id): Path<String>,
    Json(payload): Json<UpdateMarketer>,
) -> Result<Json<UserProfile>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let found = load_marketer(&state, &marketer_id).await?;
    let mut active = found.into_active_model();

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(new_password) = payload.password {
        if new_password.len() < 6 {
            return Err(ApiError::bad_request(
                "Password must be at least 6 characters",
            ));
        }
        active.password_hash = Set(password::hash(&new_password)?);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = active.update(&state.db).await?;
    Ok(Json(UserProfile::from(updated)))
}

/// Removal cascades to the marketer's coupons and commissions.
#[tracing::instrument(name = "DELETE /admin/marketers/{id}", skip(state, user))]
async fn delete_marketer(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(marketer_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_role(UserRole::Admin)?;

    let found = load_marketer(&state, &marketer_id).await?;
    found.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCoupon {
    pub code: String,
    pub commission_rate: f64,
}

#[tracing::instrument(name = "POST /admin/marketers/{id}/coupons", skip(state, user, payload))]
async fn add_coupon(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(marketer_id): Path<String>,
    Json(payload): Json<AddCoupon>,
) -> Result<(StatusCode, Json<coupon::Model>), ApiError> {
    user.require_role(UserRole::Admin)?;
    load_marketer(&state, &marketer_id).await?;

    let code = payload.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::bad_request("Coupon code is required"));
    }
    check_rate(payload.commission_rate)?;
    check_code_free(&state, &code).await?;

    let now = Utc::now().naive_utc();
    let created = coupon::ActiveModel {
        id: Set(new_id()),
        code: Set(code),
        marketer_id: Set(marketer_id),
        commission_rate: Set(payload.commission_rate),
        is_active: Set(true),
        usage_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "PATCH /admin/coupons/{id}/toggle", skip(state, user))]
async fn toggle_coupon(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(coupon_id): Path<String>,
) -> Result<Json<coupon::Model>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let found = Coupon::find_by_id(&coupon_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Coupon not found"))?;

    let is_active = found.is_active;
    let mut active = found.into_active_model();
    active.is_active = Set(!is_active);
    active.updated_at = Set(Utc::now().naive_utc());
    let updated = active.update(&state.db).await?;
    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
pub struct CommissionWeeks {
    pub weeks: Vec<WeeklySummary>,
}

#[tracing::instrument(name = "GET /admin/marketers/{id}/commissions", skip(state, user))]
async fn marketer_commissions(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(marketer_id): Path<String>,
) -> Result<Json<CommissionWeeks>, ApiError> {
    user.require_role(UserRole::Admin)?;
    load_marketer(&state, &marketer_id).await?;

    let rows = Commission::find()
        .filter(commission::Column::MarketerId.eq(&marketer_id))
        .all(&state.db)
        .await?;

    Ok(Json(CommissionWeeks {
        weeks: aggregate_weeks(&rows),
    }))
}

use std::collections::HashMap;

use axum::extract::State;
use axum::{Extension, Json, Router, routing::get, routing::post};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::commissions::{WeeklySummary, aggregate_weeks, week_bounds};
use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::{commission, coupon};
use crate::error::ApiError;
use crate::middleware::jwt::AppUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/commissions/history", get(commission_history))
        .route("/coupons/validate", post(validate_coupon))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketerStats {
    pub total_orders: i64,
    pub total_commission: i64,
    pub unpaid_commission: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_earnings: i64,
    pub current_week_orders: i64,
    pub current_week_earnings: i64,
    pub pending_payout: i64,
    pub active_coupons: i64,
}

/// Per-coupon slice of the marketer's all-time earnings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponStats {
    pub code: String,
    pub usage_count: i64,
    pub earnings: i64,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub coupons: Vec<CouponStats>,
}

pub(crate) fn stats_from(rows: &[commission::Model]) -> MarketerStats {
    MarketerStats {
        total_orders: rows.len() as i64,
        total_commission: rows.iter().map(|r| r.commission_amount).sum(),
        unpaid_commission: rows
            .iter()
            .filter(|r| !r.is_paid)
            .map(|r| r.commission_amount)
            .sum(),
    }
}

/// All-time totals, the running unpaid week and a per-coupon breakdown.
#[tracing::instrument(name = "GET /marketers/dashboard", skip(state, user))]
async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let auth = user.require_role(UserRole::Marketer)?;

    let coupons = Coupon::find()
        .filter(coupon::Column::MarketerId.eq(&auth.id))
        .order_by_desc(coupon::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let rows = Commission::find()
        .filter(commission::Column::MarketerId.eq(&auth.id))
        .all(&state.db)
        .await?;

    let (week_start, _) = week_bounds(Utc::now().naive_utc());
    let current_week: Vec<&commission::Model> = rows
        .iter()
        .filter(|r| !r.is_paid && r.week_start == week_start)
        .collect();

    let mut earnings_by_code: HashMap<&str, i64> = HashMap::new();
    for row in &rows {
        *earnings_by_code.entry(row.coupon_code.as_str()).or_default() += row.commission_amount;
    }

    let stats = DashboardStats {
        total_orders: rows.len() as i64,
        total_earnings: rows.iter().map(|r| r.commission_amount).sum(),
        current_week_orders: current_week.len() as i64,
        current_week_earnings: current_week.iter().map(|r| r.commission_amount).sum(),
        pending_payout: rows
            .iter()
            .filter(|r| !r.is_paid)
            .map(|r| r.commission_amount)
            .sum(),
        active_coupons: coupons.iter().filter(|c| c.is_active).count() as i64,
    };

    let coupons = coupons
        .into_iter()
        .map(|c| CouponStats {
            earnings: earnings_by_code.get(c.code.as_str()).copied().unwrap_or(0),
            usage_count: c.usage_count,
            is_active: c.is_active,
            code: c.code,
        })
        .collect();

    Ok(Json(DashboardResponse { stats, coupons }))
}

#[derive(Debug, Serialize)]
pub struct CommissionHistory {
    pub weeks: Vec<WeeklySummary>,
}

/// Weekly payout history, newest week first, capped at one year.
#[tracing::instrument(name = "GET /marketers/commissions/history", skip(state, user))]
async fn commission_history(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<CommissionHistory>, ApiError> {
    let auth = user.require_role(UserRole::Marketer)?;

    let rows = Commission::find()
        .filter(commission::Column::MarketerId.eq(&auth.id))
        .all(&state.db)
        .await?;

    let mut weeks = aggregate_weeks(&rows);
    weeks.truncate(52);
    Ok(Json(CommissionHistory { weeks }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateCoupon {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedCoupon {
    pub valid: bool,
    pub code: String,
    pub commission_rate: f64,
}

/// Storefront pre-checkout check. Public on purpose; inactive and unknown
/// codes answer identically.
#[tracing::instrument(name = "POST /marketers/coupons/validate", skip(state, payload))]
async fn validate_coupon(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCoupon>,
) -> Result<Json<ValidatedCoupon>, ApiError> {
    let code = payload.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::bad_request("Coupon code is required"));
    }

    let found = Coupon::find()
        .filter(coupon::Column::Code.eq(&code))
        .filter(coupon::Column::IsActive.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Invalid coupon code"))?;

    Ok(Json(ValidatedCoupon {
        valid: true,
        code: found.code,
        commission_rate: found.commission_rate,
    }))
}

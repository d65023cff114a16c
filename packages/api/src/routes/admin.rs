use axum::extract::{Path, Query, State};
use axum::{
    Extension, Json, Router,
    routing::{get, patch, post},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::{commission, order, product};
use crate::error::ApiError;
use crate::middleware::jwt::AppUser;
use crate::state::AppState;

use super::PaginationParams;
use super::orders::{OrderView, load_view};

pub mod marketers;
pub mod sellers;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/products/{product_id}/feature", patch(toggle_featured))
        .route("/commissions/pay", post(mark_week_paid))
        .merge(sellers::routes())
        .merge(marketers::routes())
}

#[tracing::instrument(name = "GET /admin/orders", skip(state, user))]
async fn list_all_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let orders = Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .limit(page.limit(50, 200))
        .offset(page.offset())
        .all(&state.db)
        .await?;

    let mut views = Vec::with_capacity(orders.len());
    for found in orders {
        views.push(load_view(&state.db, found).await?);
    }
    Ok(Json(views))
}

#[tracing::instrument(name = "PATCH /admin/products/{id}/feature", skip(state, user))]
async fn toggle_featured(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(product_id): Path<String>,
) -> Result<Json<product::Model>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let found = Product::find_by_id(&product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let featured = found.is_featured;
    let mut active = found.into_active_model();
    active.is_featured = Set(!featured);
    active.updated_at = Set(Utc::now().naive_utc());
    let updated = active.update(&state.db).await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkWeekPaid {
    pub marketer_id: String,
    pub week_start: chrono::NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkWeekPaidResponse {
    pub paid_count: u64,
}

/// Bulk payout: every unpaid commission for the marketer in exactly that
/// week becomes paid. Other weeks are untouched; the affected row count is
/// reported back.
#[tracing::instrument(name = "POST /admin/commissions/pay", skip(state, user, payload))]
async fn mark_week_paid(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<MarkWeekPaid>,
) -> Result<Json<MarkWeekPaidResponse>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let now = Utc::now().naive_utc();
    let result = Commission::update_many()
        .col_expr(commission::Column::IsPaid, Expr::value(true))
        .col_expr(commission::Column::PaidAt, Expr::value(now))
        .col_expr(commission::Column::UpdatedAt, Expr::value(now))
        .filter(commission::Column::MarketerId.eq(&payload.marketer_id))
        .filter(commission::Column::WeekStart.eq(payload.week_start))
        .filter(commission::Column::IsPaid.eq(false))
        .exec(&state.db)
        .await?;

    Ok(Json(MarkWeekPaidResponse {
        paid_count: result.rows_affected,
    }))
}

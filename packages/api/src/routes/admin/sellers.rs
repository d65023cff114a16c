use axum::extract::{Path, State};
use axum::{
    Extension, Json, Router,
    routing::{get, put},
};
use chrono::Utc;
use hyper::StatusCode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;

use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::{order, order_item, user};
use crate::error::ApiError;
use crate::ids::new_id;
use crate::middleware::jwt::AppUser;
use crate::password;
use crate::routes::orders::{OrderView, load_view_scoped};
use crate::routes::users::UserProfile;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sellers", get(list_sellers).post(create_seller))
        .route(
            "/sellers/{seller_id}",
            put(update_seller).delete(delete_seller),
        )
        .route("/sellers/{seller_id}/orders", get(seller_orders))
}

#[tracing::instrument(name = "GET /admin/sellers", skip(state, user))]
async fn list_sellers(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let sellers = User::find()
        .filter(user::Column::Role.eq(UserRole::Seller))
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(sellers.into_iter().map(UserProfile::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeller {
    pub name: String,
    pub email: String,
    pub password: String,
    pub store_name: Option<String>,
    pub phone: Option<String>,
}

#[tracing::instrument(name = "POST /admin/sellers", skip(state, user, payload))]
async fn create_seller(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<CreateSeller>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    user.require_role(UserRole::Admin)?;

    let email = payload.email.trim().to_lowercase();
    if payload.name.trim().is_empty() || email.is_empty() {
        return Err(ApiError::bad_request("Name and email are required"));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

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
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password::hash(&payload.password)?),
        role: Set(UserRole::Seller),
        store_name: Set(payload.store_name),
        phone: Set(payload.phone),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(UserProfile::from(created))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeller {
    pub name: Option<String>,
    pub store_name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

async fn load_seller(state: &AppState, seller_id: &str) -> Result<user::Model, ApiError> {
    let found = User::find_by_id(seller_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Seller not found"))?;
    if found.role != UserRole::Seller {
        return Err(ApiError::not_found("Seller not found"));
    }
    Ok(found)
}

#[tracing::instrument(name = "PUT /admin/sellers/{id}", skip(state, user, payload))]
async fn update_seller(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(seller_id): Path<String>,
    Json(payload): Json<UpdateSeller>,
) -> Result<Json<UserProfile>, ApiError> {
    user.require_role(UserRole::Admin)?;

    let found = load_seller(&state, &seller_id).await?;
    let mut active = found.into_active_model();

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(store_name) = payload.store_name {
        active.store_name = Set(Some(store_name));
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

/// Removal cascades to the seller's products through the schema.
#[tracing::instrument(name = "DELETE /admin/sellers/{id}", skip(state, user))]
async fn delete_seller(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(seller_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_role(UserRole::Admin)?;

    let found = load_seller(&state, &seller_id).await?;
    found.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "GET /admin/sellers/{id}/orders", skip(state, user))]
async fn seller_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(seller_id): Path<String>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    user.require_role(UserRole::Admin)?;
    load_seller(&state, &seller_id).await?;

    let order_ids: Vec<String> = OrderItem::find()
        .filter(order_item::Column::SellerId.eq(&seller_id))
        .select_only()
        .column(order_item::Column::OrderId)
        .distinct()
        .into_tuple()
        .all(&state.db)
        .await?;

    let orders = Order::find()
        .filter(order::Column::Id.is_in(order_ids))
        .order_by_desc(order::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut views = Vec::with_capacity(orders.len());
    for found in orders {
        views.push(load_view_scoped(&state.db, found, Some(&seller_id)).await?);
    }
    Ok(Json(views))
}

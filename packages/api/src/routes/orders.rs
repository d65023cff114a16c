use axum::extract::{Path, Query, State};
use axum::{Extension, Json, Router, routing::get, routing::put};
use chrono::Utc;
use hyper::StatusCode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::{OrderStatus, PaymentStatus, UserRole};
use crate::entity::{order, order_item, tracking_entry, user};
use crate::error::ApiError;
use crate::ids::new_id;
use crate::middleware::jwt::{AppUser, AuthUser};
use crate::state::AppState;

use super::PaginationParams;
use super::users::Address;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{order_id}", get(get_order))
        .route("/{order_id}/status", put(update_status))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Line-item snapshots plus the subtotal they add up to.
pub struct ResolvedCart {
    pub items: Vec<order_item::ActiveModel>,
    pub subtotal: i64,
}

/// Resolve requested items against the live catalog, failing the whole
/// checkout if any id is unknown. Prices and seller ids are frozen into
/// the snapshot here.
pub async fn resolve_cart<C: ConnectionTrait>(
    db: &C,
    order_id: &str,
    items: &[CheckoutItem],
) -> Result<ResolvedCart, ApiError> {
    if items.is_empty() {
        return Err(ApiError::bad_request("Order must contain at least one item"));
    }

    let mut resolved = Vec::with_capacity(items.len());
    let mut subtotal: i64 = 0;

    for item in items {
        if item.quantity <= 0 {
            return Err(ApiError::bad_request("Quantity must be positive"));
        }
        let product = Product::find_by_id(&item.product_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::bad_request("One or more products no longer exist"))?;

        subtotal += product.price * item.quantity;
        resolved.push(order_item::ActiveModel {
            id: Set(new_id()),
            order_id: Set(order_id.to_string()),
            product_id: Set(product.id),
            seller_id: Set(product.seller_id),
            name: Set(product.name),
            price: Set(product.price),
            quantity: Set(item.quantity),
        });
    }

    Ok(ResolvedCart {
        items: resolved,
        subtotal,
    })
}

/// Append one immutable entry to an order's tracking log.
pub async fn append_tracking<C: ConnectionTrait>(
    db: &C,
    order_id: &str,
    status: OrderStatus,
    message: &str,
) -> Result<(), ApiError> {
    tracking_entry::ActiveModel {
        id: Set(new_id()),
        order_id: Set(order_id.to_string()),
        status: Set(status.as_str().to_string()),
        message: Set(message.to_string()),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Full order as clients see it: the row plus its line items and log.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub tracking: Vec<tracking_entry::Model>,
}

pub async fn load_view<C: ConnectionTrait>(
    db: &C,
    order: order::Model,
) -> Result<OrderView, ApiError> {
    load_view_scoped(db, order, None).await
}

/// `seller_id` narrows the line items to that seller's slice of the order;
/// sellers never see other sellers' items or prices.
pub async fn load_view_scoped<C: ConnectionTrait>(
    db: &C,
    order: order::Model,
    seller_id: Option<&str>,
) -> Result<OrderView, ApiError> {
    let mut items_query = OrderItem::find().filter(order_item::Column::OrderId.eq(&order.id));
    if let Some(seller_id) = seller_id {
        items_query = items_query.filter(order_item::Column::SellerId.eq(seller_id));
    }
    let items = items_query.all(db).await?;
    let tracking = TrackingEntry::find()
        .filter(tracking_entry::Column::OrderId.eq(&order.id))
        .order_by_asc(tracking_entry::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(OrderView {
        order,
        items,
        tracking,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub items: Vec<CheckoutItem>,
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: Address,
}

/// Shipping details as stored on the customer's profile, used whenever a
/// checkout omits an explicit address.
pub fn profile_shipping(customer: &user::Model) -> ShippingAddress {
    ShippingAddress {
        name: Some(customer.name.clone()),
        phone: customer.phone.clone(),
        address: Address {
            line1: customer.address_line1.clone(),
            line2: customer.address_line2.clone(),
            city: customer.address_city.clone(),
            state: customer.address_state.clone(),
            postal_code: customer.address_postal_code.clone(),
            country: customer.address_country.clone(),
        },
    }
}

pub fn apply_shipping_snapshot(
    active: &mut order::ActiveModel,
    shipping: Option<ShippingAddress>,
) {
    let Some(shipping) = shipping else {
        return;
    };
    active.ship_name = Set(shipping.name);
    active.ship_phone = Set(shipping.phone);
    active.ship_line1 = Set(shipping.address.line1);
    active.ship_line2 = Set(shipping.address.line2);
    active.ship_city = Set(shipping.address.city);
    active.ship_state = Set(shipping.address.state);
    active.ship_postal_code = Set(shipping.address.postal_code);
    active.ship_country = Set(shipping.address.country);
}

/// Direct checkout without a payment gateway. Shipping is free, the order
/// starts out awaiting payment.
#[tracing::instrument(name = "POST /orders", skip(state, user, payload))]
async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<CreateOrder>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    let auth = user.require_role(UserRole::Customer)?;

    let order_id = new_id();
    let cart = resolve_cart(&state.db, &order_id, &payload.items).await?;
    let shipping: i64 = 0;
    let total = cart.subtotal + shipping;
    let now = Utc::now().naive_utc();

    let mut active = order::ActiveModel {
        id: Set(order_id.clone()),
        user_id: Set(auth.id.clone()),
        subtotal: Set(cart.subtotal),
        shipping: Set(shipping),
        total: Set(total),
        coupon_code: Set(None),
        coupon_discount: Set(0),
        status: Set(OrderStatus::PaymentPending),
        payment_provider: Set("none".to_string()),
        payment_status: Set(PaymentStatus::Created),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply_shipping_snapshot(&mut active, payload.shipping_address);
    let created = active.insert(&state.db).await?;

    for item in cart.items {
        item.insert(&state.db).await?;
    }
    append_tracking(
        &state.db,
        &order_id,
        OrderStatus::PaymentPending,
        "Awaiting payment confirmation",
    )
    .await?;

    let view = load_view(&state.db, created).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Customers see their own orders; sellers see every paid-for order
/// containing at least one of their items, narrowed to those items.
#[tracing::instrument(name = "GET /orders", skip(state, user))]
async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let auth = user.require_any(&[UserRole::Customer, UserRole::Seller])?;

    let (orders, item_scope) = match auth.role {
        UserRole::Customer => {
            let orders = Order::find()
                .filter(order::Column::UserId.eq(&auth.id))
                .order_by_desc(order::Column::CreatedAt)
                .limit(page.limit(50, 200))
                .offset(page.offset())
                .all(&state.db)
                .await?;
            (orders, None)
        }
        UserRole::Seller => {
            let order_ids: Vec<String> = OrderItem::find()
                .filter(order_item::Column::SellerId.eq(&auth.id))
                .select_only()
                .column(order_item::Column::OrderId)
                .distinct()
                .into_tuple()
                .all(&state.db)
                .await?;
            let orders = Order::find()
                .filter(order::Column::Id.is_in(order_ids))
                .filter(order::Column::Status.ne(OrderStatus::PaymentPending))
                .order_by_desc(order::Column::CreatedAt)
                .limit(page.limit(50, 200))
                .offset(page.offset())
                .all(&state.db)
                .await?;
            (orders, Some(auth.id.as_str()))
        }
        UserRole::Admin | UserRole::Marketer => (Vec::new(), None),
    };

    let mut views = Vec::with_capacity(orders.len());
    for found in orders {
        views.push(load_view_scoped(&state.db, found, item_scope).await?);
    }
    Ok(Json(views))
}

async fn seller_owns_items(
    state: &AppState,
    order_id: &str,
    seller_id: &str,
) -> Result<bool, ApiError> {
    let owned = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .filter(order_item::Column::SellerId.eq(seller_id))
        .one(&state.db)
        .await?;
    Ok(owned.is_some())
}

#[tracing::instrument(name = "GET /orders/{id}", skip(state, user))]
async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    let auth = user.required()?;

    let found = Order::find_by_id(&order_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    let allowed = match auth.role {
        UserRole::Admin => true,
        UserRole::Customer => found.user_id == auth.id,
        UserRole::Seller => seller_owns_items(&state, &order_id, &auth.id).await?,
        UserRole::Marketer => false,
    };
    if !allowed {
        return Err(ApiError::not_found("Order not found"));
    }

    let view = load_view(&state.db, found).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    pub status: OrderStatus,
    pub message: Option<String>,
}

/// Shipping lifecycle transitions, driven by a seller with items on the
/// order. Orders still awaiting payment cannot be moved.
#[tracing::instrument(name = "PUT /orders/{id}/status", skip(state, user, payload))]
async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(order_id): Path<String>,
    Json(payload): Json<UpdateStatus>,
) -> Result<Json<OrderView>, ApiError> {
    let auth: &AuthUser = user.require_role(UserRole::Seller)?;

    let found = Order::find_by_id(&order_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    if !seller_owns_items(&state, &order_id, &auth.id).await? {
        return Err(ApiError::forbidden("No items of yours on this order"));
    }
    if found.status == OrderStatus::PaymentPending {
        return Err(ApiError::bad_request(
            "Order has not been paid for yet",
        ));
    }
    if !matches!(
        payload.status,
        OrderStatus::Packed | OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled
    ) {
        return Err(ApiError::bad_request("Invalid target status"));
    }
    if !found.status.seller_can_advance_to(payload.status) {
        return Err(ApiError::bad_request("Invalid status transition"));
    }

    let next = payload.status;
    let mut active = found.into_active_model();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().naive_utc());
    let updated = active.update(&state.db).await?;

    let message = payload
        .message
        .unwrap_or_else(|| format!("Order {}", next.as_str()));
    append_tracking(&state.db, &order_id, next, &message).await?;

    let view = load_view(&state.db, updated).await?;
    Ok(Json(view))
}

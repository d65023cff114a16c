use axum::extract::State;
use axum::{Extension, Json, Router, routing::post};
use chrono::Utc;
use hyper::StatusCode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::commissions::{self, coupon_discount};
use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::{OrderStatus, PaymentStatus, UserRole};
use crate::entity::{commission, coupon, order};
use crate::error::ApiError;
use crate::ids::new_id;
use crate::middleware::jwt::AppUser;
use crate::payment::CreateGatewayOrder;
use crate::state::AppState;

use super::orders::{
    CheckoutItem, OrderView, ShippingAddress, append_tracking, apply_shipping_snapshot, load_view,
    profile_shipping, resolve_cart,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/razorpay/order", post(create_gateway_order))
        .route("/razorpay/verify", post(verify_payment))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCheckout {
    pub items: Vec<CheckoutItem>,
    pub coupon_code: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCheckoutResponse {
    pub order: OrderView,
    pub razorpay_order_id: String,
    /// Amount in minor currency units, as the gateway echoes it.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// Open a gateway order for a checkout. The internal order is persisted in
/// `payment_pending`; nothing becomes visible to sellers until the payment
/// is verified.
#[tracing::instrument(name = "POST /payments/razorpay/order", skip(state, user, payload))]
async fn create_gateway_order(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<GatewayCheckout>,
) -> Result<(StatusCode, Json<GatewayCheckoutResponse>), ApiError> {
    let auth = user.require_role(UserRole::Customer)?;
    let gateway = state.gateway()?.clone();

    // A checkout without an explicit address ships to the profile address.
    let shipping_address = match payload.shipping_address {
        Some(shipping) => shipping,
        None => {
            let customer = User::find_by_id(&auth.id)
                .one(&state.db)
                .await?
                .ok_or_else(|| ApiError::not_found("User not found"))?;
            profile_shipping(&customer)
        }
    };

    let order_id = new_id();
    let cart = resolve_cart(&state.db, &order_id, &payload.items).await?;
    let shipping: i64 = 0;
    let pre_discount_total = cart.subtotal + shipping;

    let coupon = match payload.coupon_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let code = code.to_uppercase();
            let found = Coupon::find()
                .filter(coupon::Column::Code.eq(&code))
                .filter(coupon::Column::IsActive.eq(true))
                .one(&state.db)
                .await?
                .ok_or_else(|| ApiError::bad_request("Invalid coupon code"))?;
            Some(found)
        }
        _ => None,
    };

    let discount = coupon
        .as_ref()
        .map(|c| coupon_discount(pre_discount_total, c.commission_rate))
        .unwrap_or(0);
    let total = pre_discount_total - discount;

    let gateway_order = gateway
        .create_order(CreateGatewayOrder {
            amount: total * 100,
            currency: "INR".to_string(),
            receipt: order_id.clone(),
        })
        .await
        .map_err(|err| {
            tracing::error!("Gateway order creation failed: {}", err);
            ApiError::upstream("Could not initiate payment")
        })?;

    let now = Utc::now().naive_utc();
    let mut active = order::ActiveModel {
        id: Set(order_id.clone()),
        user_id: Set(auth.id.clone()),
        subtotal: Set(cart.subtotal),
        shipping: Set(shipping),
        total: Set(total),
        coupon_code: Set(coupon.as_ref().map(|c| c.code.clone())),
        coupon_discount: Set(discount),
        status: Set(OrderStatus::PaymentPending),
        payment_provider: Set("razorpay".to_string()),
        payment_order_id: Set(Some(gateway_order.id.clone())),
        payment_amount: Set(Some(gateway_order.amount)),
        payment_currency: Set(Some(gateway_order.currency.clone())),
        payment_status: Set(PaymentStatus::Created),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply_shipping_snapshot(&mut active, Some(shipping_address));
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
    Ok((
        StatusCode::CREATED,
        Json(GatewayCheckoutResponse {
            order: view,
            razorpay_order_id: gateway_order.id,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            key_id: gateway.client_key().to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPayment {
    pub order_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

async fn reject_payment(
    state: &AppState,
    found: order::Model,
    reason: &str,
) -> Result<ApiError, ApiError> {
    let order_id = found.id.clone();
    let mut active = found.into_active_model();
    active.payment_status = Set(PaymentStatus::Failed);
    active.status = Set(OrderStatus::Cancelled);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;
    append_tracking(&state.db, &order_id, OrderStatus::Cancelled, reason).await?;
    Ok(ApiError::bad_request("Payment verification failed"))
}

/// Reconcile the gateway's signed callback against the stored order.
///
/// Success runs as one transaction: coupon usage, the commission row for
/// the current payout week, the payment flip to `paid` and the order flip
/// to `confirmed` land together or not at all.
#[tracing::instrument(name = "POST /payments/razorpay/verify", skip(state, user, payload))]
async fn verify_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<VerifyPayment>,
) -> Result<Json<OrderView>, ApiError> {
    let auth = user.require_role(UserRole::Customer)?;
    let gateway = state.gateway()?.clone();

    let (Some(order_id), Some(gateway_order_id), Some(payment_id), Some(signature)) = (
        payload.order_id,
        payload.razorpay_order_id,
        payload.razorpay_payment_id,
        payload.razorpay_signature,
    ) else {
        return Err(ApiError::bad_request("Missing payment verification fields"));
    };

    let found = Order::find_by_id(&order_id)
        .filter(order::Column::UserId.eq(&auth.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    // Idempotent short-circuit for a repeated success callback.
    if found.payment_status == PaymentStatus::Paid {
        let view = load_view(&state.db, found).await?;
        return Ok(Json(view));
    }
    // Already failed once; never silently re-process.
    if found.payment_status != PaymentStatus::Created {
        return Err(ApiError::bad_request("Payment verification failed"));
    }

    // Cross-order replay guard.
    if found.payment_order_id.as_deref() != Some(gateway_order_id.as_str()) {
        return Err(reject_payment(&state, found, "Payment reference mismatch").await?);
    }

    if !gateway.verify_signature(&gateway_order_id, &payment_id, &signature) {
        return Err(reject_payment(&state, found, "Payment signature invalid").await?);
    }

    let now = Utc::now().naive_utc();
    let coupon_code = found.coupon_code.clone();
    let order_total = found.total;
    let confirmed_order_id = found.id.clone();

    let updated = state
        .db
        .transaction::<_, order::Model, ApiError>(move |txn| {
            Box::pin(async move {
                if let Some(code) = coupon_code {
                    // A coupon deactivated since checkout earns nothing.
                    let matched = Coupon::find()
                        .filter(coupon::Column::Code.eq(&code))
                        .filter(coupon::Column::IsActive.eq(true))
                        .one(txn)
                        .await?;
                    if let Some(matched) = matched {
                        let marketer_id = matched.marketer_id.clone();
                        let rate = matched.commission_rate;
                        let usage = matched.usage_count;
                        let mut active_coupon = matched.into_active_model();
                        active_coupon.usage_count = Set(usage + 1);
                        active_coupon.updated_at = Set(now);
                        active_coupon.update(txn).await?;

                        let (week_start, week_end) = commissions::week_bounds(now);
                        commission::ActiveModel {
                            id: Set(new_id()),
                            marketer_id: Set(marketer_id),
                            order_id: Set(confirmed_order_id.clone()),
                            coupon_code: Set(code),
                            order_amount: Set(order_total),
                            commission_rate: Set(rate),
                            commission_amount: Set(commissions::rate_share(order_total, rate)),
                            week_start: Set(week_start),
                            week_end: Set(week_end),
                            is_paid: Set(false),
                            paid_at: Set(None),
                            created_at: Set(now),
                            updated_at: Set(now),
                        }
                        .insert(txn)
                        .await?;
                    }
                }

                let mut active = found.into_active_model();
                active.payment_status = Set(PaymentStatus::Paid);
                active.payment_id = Set(Some(payment_id));
                active.payment_signature = Set(Some(signature));
                active.status = Set(OrderStatus::Confirmed);
                active.updated_at = Set(now);
                let updated = active.update(txn).await?;

                append_tracking(txn, &confirmed_order_id, OrderStatus::Confirmed, "Payment received")
                    .await?;

                Ok(updated)
            })
        })
        .await?;

    let view = load_view(&state.db, updated).await?;
    Ok(Json(view))
}

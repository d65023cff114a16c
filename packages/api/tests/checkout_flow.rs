mod common;

use axum::http::StatusCode;
use ratna_api::entity::prelude::*;
use ratna_api::entity::sea_orm_active_enums::UserRole;
use ratna_api::entity::{commission, coupon};
use ratna_api::sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use serde_json::json;

use common::{spawn_app, valid_signature};

#[tokio::test]
async fn direct_checkout_computes_totals_and_opens_tracking() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Necklace", 100).await;

    let (status, body) = app
        .post(
            "/orders",
            Some(&customer_token),
            json!({"items": [{"productId": product_id, "quantity": 2}]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subtotal"], 200);
    assert_eq!(body["shipping"], 0);
    assert_eq!(body["total"], 200);
    assert_eq!(body["status"], "payment_pending");
    assert_eq!(body["tracking"].as_array().unwrap().len(), 1);
    assert_eq!(body["tracking"][0]["message"], "Awaiting payment confirmation");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    // line item is a snapshot
    assert_eq!(body["items"][0]["price"], 100);
    assert_eq!(body["items"][0]["sellerId"], seller_id);
}

#[tokio::test]
async fn checkout_fails_whole_request_on_unknown_product() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Necklace", 100).await;

    let (status, _) = app
        .post(
            "/orders",
            Some(&customer_token),
            json!({"items": [
                {"productId": product_id, "quantity": 1},
                {"productId": "missing", "quantity": 1}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let orders = Order::find().all(&app.state.db).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn coupon_discount_follows_rounding_rule() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (marketer_id, _) = app
        .seed_user("Marketer", "m@example.com", UserRole::Marketer)
        .await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;
    app.seed_coupon(&marketer_id, "SAVE10", 10.0).await;

    let (status, body) = app
        .post(
            "/payments/razorpay/order",
            Some(&customer_token),
            json!({
                "items": [{"productId": product_id, "quantity": 2}],
                "couponCode": "save10"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["subtotal"], 1000);
    assert_eq!(body["order"]["couponDiscount"], 100);
    assert_eq!(body["order"]["total"], 900);
    // gateway receives minor units
    assert_eq!(body["amount"], 90000);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["keyId"], "rzp_test_key");
}

#[tokio::test]
async fn inactive_coupon_is_rejected() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (marketer_id, _) = app
        .seed_user("Marketer", "m@example.com", UserRole::Marketer)
        .await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;
    let coupon_id = app.seed_coupon(&marketer_id, "SAVE10", 10.0).await;

    let found = Coupon::find_by_id(&coupon_id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: coupon::ActiveModel = found.into_active_model();
    active.is_active = Set(false);
    active.update(&app.state.db).await.unwrap();

    let (status, _) = app
        .post(
            "/payments/razorpay/order",
            Some(&customer_token),
            json!({
                "items": [{"productId": product_id, "quantity": 1}],
                "couponCode": "SAVE10"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn paid_checkout(
    app: &common::TestApp,
    customer_token: &str,
    product_id: &str,
    coupon_code: Option<&str>,
) -> (String, String) {
    let mut payload = json!({"items": [{"productId": product_id, "quantity": 2}]});
    if let Some(code) = coupon_code {
        payload["couponCode"] = json!(code);
    }
    let (status, body) = app
        .post("/payments/razorpay/order", Some(customer_token), payload)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let gateway_order_id = body["razorpayOrderId"].as_str().unwrap().to_string();
    (order_id, gateway_order_id)
}

#[tokio::test]
async fn verified_payment_confirms_order_and_accrues_commission() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (marketer_id, _) = app
        .seed_user("Marketer", "m@example.com", UserRole::Marketer)
        .await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;
    app.seed_coupon(&marketer_id, "SAVE10", 10.0).await;

    let (order_id, gateway_order_id) =
        paid_checkout(&app, &customer_token, &product_id, Some("SAVE10")).await;

    let signature = valid_signature(&gateway_order_id, "pay_1");
    let (status, body) = app
        .post(
            "/payments/razorpay/verify",
            Some(&customer_token),
            json!({
                "orderId": order_id,
                "razorpayOrderId": gateway_order_id,
                "razorpayPaymentId": "pay_1",
                "razorpaySignature": signature
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["paymentStatus"], "paid");
    assert_eq!(body["tracking"].as_array().unwrap().len(), 2);

    // exactly one commission row, on the discounted total
    let rows = Commission::find()
        .filter(commission::Column::MarketerId.eq(&marketer_id))
        .all(&app.state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].order_id, order_id);
    assert_eq!(rows[0].order_amount, 900);
    assert_eq!(rows[0].commission_amount, 90);
    assert!(!rows[0].is_paid);

    // coupon usage incremented once
    let used = Coupon::find()
        .filter(coupon::Column::Code.eq("SAVE10"))
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(used.usage_count, 1);

    // re-verifying a paid order is an idempotent no-op
    let signature = valid_signature(&gateway_order_id, "pay_1");
    let (status, body) = app
        .post(
            "/payments/razorpay/verify",
            Some(&customer_token),
            json!({
                "orderId": order_id,
                "razorpayOrderId": gateway_order_id,
                "razorpayPaymentId": "pay_1",
                "razorpaySignature": signature
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    let rows = Commission::find().all(&app.state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn coupon_deactivated_after_checkout_earns_nothing() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (marketer_id, _) = app
        .seed_user("Marketer", "m@example.com", UserRole::Marketer)
        .await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;
    let coupon_id = app.seed_coupon(&marketer_id, "SAVE10", 10.0).await;

    let (order_id, gateway_order_id) =
        paid_checkout(&app, &customer_token, &product_id, Some("SAVE10")).await;

    // the coupon is pulled between checkout and the payment callback
    let found = Coupon::find_by_id(&coupon_id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: coupon::ActiveModel = found.into_active_model();
    active.is_active = Set(false);
    active.update(&app.state.db).await.unwrap();

    let signature = valid_signature(&gateway_order_id, "pay_1");
    let (status, body) = app
        .post(
            "/payments/razorpay/verify",
            Some(&customer_token),
            json!({
                "orderId": order_id,
                "razorpayOrderId": gateway_order_id,
                "razorpayPaymentId": "pay_1",
                "razorpaySignature": signature
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    // the customer keeps the discount, the marketer earns nothing
    let rows = Commission::find().all(&app.state.db).await.unwrap();
    assert!(rows.is_empty());
    let coupon = Coupon::find_by_id(&coupon_id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(coupon.usage_count, 0);
}

#[tokio::test]
async fn gateway_checkout_falls_back_to_profile_address() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;

    let (status, _) = app
        .put(
            "/users/me",
            Some(&customer_token),
            json!({"address": {
                "line1": "12 MG Road",
                "city": "Jaipur",
                "state": "Rajasthan",
                "postalCode": "302001",
                "country": "India"
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/payments/razorpay/order",
            Some(&customer_token),
            json!({"items": [{"productId": product_id, "quantity": 1}]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["shipName"], "Customer");
    assert_eq!(body["order"]["shipLine1"], "12 MG Road");
    assert_eq!(body["order"]["shipCity"], "Jaipur");
    assert_eq!(body["order"]["shipPostalCode"], "302001");

    // an explicit address in the payload still wins
    let (_, body) = app
        .post(
            "/payments/razorpay/order",
            Some(&customer_token),
            json!({
                "items": [{"productId": product_id, "quantity": 1}],
                "shippingAddress": {"line1": "7 Park Street", "city": "Kolkata"}
            }),
        )
        .await;
    assert_eq!(body["order"]["shipLine1"], "7 Park Street");
    assert_eq!(body["order"]["shipCity"], "Kolkata");
}

#[tokio::test]
async fn tampered_signature_cancels_order_and_stays_rejected() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;

    let (order_id, gateway_order_id) =
        paid_checkout(&app, &customer_token, &product_id, None).await;

    let verify_payload = json!({
        "orderId": order_id,
        "razorpayOrderId": gateway_order_id,
        "razorpayPaymentId": "pay_1",
        "razorpaySignature": "deadbeef"
    });

    let (status, body) = app
        .post("/payments/razorpay/verify", Some(&customer_token), verify_payload.clone())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Payment verification failed");

    let (status, order) = app.get(&format!("/orders/{}", order_id), Some(&customer_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "cancelled");
    assert_eq!(order["paymentStatus"], "failed");

    // even a now-correct signature must not resurrect the order
    let signature = valid_signature(&gateway_order_id, "pay_1");
    let (status, _) = app
        .post(
            "/payments/razorpay/verify",
            Some(&customer_token),
            json!({
                "orderId": order_id,
                "razorpayOrderId": gateway_order_id,
                "razorpayPaymentId": "pay_1",
                "razorpaySignature": signature
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mismatched_gateway_order_id_fails_verification() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;

    let (order_id, _) = paid_checkout(&app, &customer_token, &product_id, None).await;

    // signature is valid for the wrong gateway order
    let signature = valid_signature("rzp_other", "pay_1");
    let (status, _) = app
        .post(
            "/payments/razorpay/verify",
            Some(&customer_token),
            json!({
                "orderId": order_id,
                "razorpayOrderId": "rzp_other",
                "razorpayPaymentId": "pay_1",
                "razorpaySignature": signature
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, order) = app.get(&format!("/orders/{}", order_id), Some(&customer_token)).await;
    assert_eq!(order["status"], "cancelled");
}

#[tokio::test]
async fn verify_rejects_missing_fields_and_foreign_orders() {
    let app = spawn_app().await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let (_, other_token) = app
        .seed_user("Other", "o@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Saree", 500).await;

    let (order_id, gateway_order_id) =
        paid_checkout(&app, &customer_token, &product_id, None).await;

    let (status, _) = app
        .post(
            "/payments/razorpay/verify",
            Some(&customer_token),
            json!({"orderId": order_id}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let signature = valid_signature(&gateway_order_id, "pay_1");
    let (status, _) = app
        .post(
            "/payments/razorpay/verify",
            Some(&other_token),
            json!({
                "orderId": order_id,
                "razorpayOrderId": gateway_order_id,
                "razorpayPaymentId": "pay_1",
                "razorpaySignature": signature
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

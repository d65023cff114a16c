mod common;

use axum::http::StatusCode;
use ratna_api::entity::prelude::*;
use ratna_api::sea_orm::EntityTrait;
use serde_json::json;

use common::spawn_app;
use ratna_api::entity::sea_orm_active_enums::UserRole;

#[tokio::test]
async fn profile_updates_including_address() {
    let app = spawn_app().await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;

    let (status, body) = app
        .put(
            "/users/me",
            Some(&customer_token),
            json!({
                "name": "  Asha  ",
                "phone": "9876543210",
                "address": {
                    "line1": "12 MG Road",
                    "city": "Bengaluru",
                    "state": "Karnataka",
                    "postalCode": "560001",
                    "country": "India"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Asha");
    assert_eq!(body["address"]["city"], "Bengaluru");
    assert_eq!(body["address"]["line2"], serde_json::Value::Null);

    // a later address update replaces the whole block
    let (_, body) = app
        .put(
            "/users/me",
            Some(&customer_token),
            json!({"address": {"line1": "1 New Street"}}),
        )
        .await;
    assert_eq!(body["address"]["line1"], "1 New Street");
    assert_eq!(body["address"]["city"], serde_json::Value::Null);
}

#[tokio::test]
async fn store_name_is_for_sellers_only() {
    let app = spawn_app().await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let (_, seller_token) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;

    let (status, body) = app
        .put(
            "/users/me",
            Some(&customer_token),
            json!({"storeName": "My Shop"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only sellers have a store name");

    let (status, body) = app
        .put(
            "/users/me",
            Some(&seller_token),
            json!({"storeName": "Ratna Jewels"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storeName"], "Ratna Jewels");
}

#[tokio::test]
async fn admin_manages_sellers() {
    let app = spawn_app().await;
    let (_, admin_token) = app.seed_user("Admin", "a@example.com", UserRole::Admin).await;

    let (status, body) = app
        .post(
            "/admin/sellers",
            Some(&admin_token),
            json!({
                "name": "New Seller",
                "email": "Seller@Example.com",
                "password": "password123",
                "storeName": "Ratna Jewels"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "seller@example.com");
    assert_eq!(body["role"], "seller");
    let seller_id = body["id"].as_str().unwrap().to_string();

    // reusing the email conflicts, whatever the casing
    let (status, _) = app
        .post(
            "/admin/sellers",
            Some(&admin_token),
            json!({
                "name": "Dup",
                "email": "seller@example.com",
                "password": "password123"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .put(
            &format!("/admin/sellers/{}", seller_id),
            Some(&admin_token),
            json!({"storeName": "Renamed Store"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storeName"], "Renamed Store");

    let (status, body) = app.get("/admin/sellers", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/admin/sellers/{}", seller_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(User::find_by_id(&seller_id)
        .one(&app.state.db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn admin_views_a_sellers_orders() {
    let app = spawn_app().await;
    let (_, admin_token) = app.seed_user("Admin", "a@example.com", UserRole::Admin).await;
    let (seller_id, _) = app.seed_user("Seller", "s@example.com", UserRole::Seller).await;
    let (other_seller_id, _) = app
        .seed_user("Other", "o@example.com", UserRole::Seller)
        .await;
    let (_, customer_token) = app
        .seed_user("Customer", "c@example.com", UserRole::Customer)
        .await;
    let product_id = app.seed_product(&seller_id, "Necklace", 500).await;
    let other_product_id = app.seed_product(&other_seller_id, "Ring", 200).await;

    app.post(
        "/orders",
        Some(&customer_token),
        json!({"items": [{"productId": product_id, "quantity": 1}]}),
    )
    .await;
    app.post(
        "/orders",
        Some(&customer_token),
        json!({"items": [{"productId": other_product_id, "quantity": 1}]}),
    )
    .await;
    // a mixed order carries items from both sellers
    app.post(
        "/orders",
        Some(&customer_token),
        json!({"items": [
            {"productId": product_id, "quantity": 1},
            {"productId": other_product_id, "quantity": 1},
        ]}),
    )
    .await;

    let (status, body) = app
        .get(&format!("/admin/sellers/{}/orders", seller_id), Some(&admin_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let scoped = body.as_array().unwrap();
    assert_eq!(scoped.len(), 2);
    // the mixed order is narrowed to the seller's own line items
    for order in scoped {
        let items = order["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Necklace");
    }

    // the all-orders view is not scoped
    let (status, body) = app.get("/admin/orders", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    // and it is admin only
    let (status, _) = app.get("/admin/orders", Some(&customer_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use ratna_api::config::Config;
use ratna_api::construct_router;
use ratna_api::entity;
use ratna_api::entity::sea_orm_active_enums::{ProductCategory, UserRole};
use ratna_api::mail::{EmailMessage, MailClient};
use ratna_api::media::{ImageStore, StoredImage};
use ratna_api::payment::{CreateGatewayOrder, GatewayOrder, PaymentGateway, sign_payment};
use ratna_api::sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema, Set,
};
use ratna_api::state::{AppState, State};
use serde_json::Value;
use tower::ServiceExt;

pub const GATEWAY_SECRET: &str = "test-gateway-secret";

/// Deterministic stand-in for the payment provider. Orders get an id derived
/// from the receipt so tests can predict it; signatures use the real HMAC
/// scheme with a fixed secret.
pub struct MockGateway;

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder> {
        Ok(GatewayOrder {
            id: format!("rzp_{}", request.receipt),
            amount: request.amount,
            currency: request.currency,
        })
    }

    fn client_key(&self) -> &str {
        "rzp_test_key"
    }

    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool {
        ratna_api::payment::verify_payment_signature(
            GATEWAY_SECRET,
            gateway_order_id,
            payment_id,
            signature,
        )
    }
}

/// Records outgoing mail instead of sending it.
#[derive(Clone, Default)]
pub struct MockMailClient {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
}

#[async_trait::async_trait]
impl MailClient for MockMailClient {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    fn from_email(&self) -> &str {
        "test@example.com"
    }

    fn from_name(&self) -> &str {
        "Test"
    }
}

/// Accepts every upload and hands back a fake CDN URL.
pub struct MockImageStore;

#[async_trait::async_trait]
impl ImageStore for MockImageStore {
    async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> Result<StoredImage> {
        Ok(StoredImage {
            provider_id: format!("mock/{}", filename),
            url: format!("https://cdn.test/{}", filename),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mail: MockMailClient,
}

async fn create_tables(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let statements = vec![
        schema.create_table_from_entity(entity::user::Entity),
        schema.create_table_from_entity(entity::product::Entity),
        schema.create_table_from_entity(entity::coupon::Entity),
        schema.create_table_from_entity(entity::order::Entity),
        schema.create_table_from_entity(entity::order_item::Entity),
        schema.create_table_from_entity(entity::tracking_entry::Entity),
        schema.create_table_from_entity(entity::commission::Entity),
        schema.create_table_from_entity(entity::image::Entity),
    ];
    for statement in statements {
        db.execute(backend.build(&statement))
            .await
            .expect("failed to create table");
    }
}

pub async fn spawn_app() -> TestApp {
    // single connection so the in-memory database is shared
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1);
    let db = Database::connect(opt).await.expect("sqlite connect");
    create_tables(&db).await;

    let mail = MockMailClient::default();
    let state = Arc::new(
        State::new(Config::new("test-secret"), db)
            .with_gateway(Arc::new(MockGateway))
            .with_mail_client(Arc::new(mail.clone()))
            .with_image_store(Arc::new(MockImageStore)),
    );
    let router = construct_router(state.clone());

    TestApp {
        router,
        state,
        mail,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("/api{}", path));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request build"),
            None => builder.body(Body::empty()).expect("request build"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body read")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, token, Some(body)).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", path, token, None).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("PATCH", path, token, None).await
    }

    pub async fn seed_user(&self, name: &str, email: &str, role: UserRole) -> (String, String) {
        let now = chrono::Utc::now().naive_utc();
        let created = entity::user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().simple().to_string()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(ratna_api::password::hash("password123").unwrap()),
            role: Set(role),
            store_name: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("seed user");
        let token = self.state.issue_token(&created).expect("token");
        (created.id, token)
    }

    pub async fn seed_product(&self, seller_id: &str, name: &str, price: i64) -> String {
        let now = chrono::Utc::now().naive_utc();
        let created = entity::product::ActiveModel {
            id: Set(uuid::Uuid::new_v4().simple().to_string()),
            name: Set(name.to_string()),
            category: Set(ProductCategory::Jewellery),
            sub_category: Set("necklace".to_string()),
            price: Set(price),
            original_price: Set(None),
            description: Set("test product".to_string()),
            images: Set(Default::default()),
            stock: Set(100),
            rating: Set(0.0),
            review_count: Set(0),
            is_featured: Set(false),
            seller_id: Set(seller_id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.state.db)
        .await
        .expect("seed product");
        created.id
    }

    pub async fn seed_coupon(&self, marketer_id: &str, code: &str, rate: f64) -> String {
        let now = chrono::Utc::now().naive_utc();
        let created = entity::coupon::ActiveModel {
            id: Set(uuid::Uuid::new_v4().simple().to_string()),
            code: Set(code.to_string()),
            marketer_id: Set(marketer_id.to_string()),
            commission_rate: Set(rate),
            is_active: Set(true),
            usage_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.state.db)
        .await
        .expect("seed coupon");
        created.id
    }
}

/// Signature the gateway would attach to a successful payment in tests.
pub fn valid_signature(gateway_order_id: &str, payment_id: &str) -> String {
    sign_payment(GATEWAY_SECRET, gateway_order_id, payment_id).expect("sign")
}

use ratna_api::entity::prelude::*;
use ratna_api::entity::sea_orm_active_enums::{ProductCategory, UserRole};
use ratna_api::entity::{coupon, product, user};
use ratna_api::password;
use ratna_api::sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

async fn user_exists(db: &DatabaseConnection, email: &str) -> Result<bool, anyhow::Error> {
    Ok(User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .is_some())
}

async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    plain_password: &str,
    role: UserRole,
    store_name: Option<&str>,
) -> Result<user::Model, anyhow::Error> {
    let now = chrono::Utc::now().naive_utc();
    let created = user::ActiveModel {
        id: Set(new_id()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password::hash(plain_password)?),
        role: Set(role),
        store_name: Set(store_name.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!("Seeded account {}", email);
    Ok(created)
}

/// Seed the demo accounts and catalog used by local development. Each step
/// is keyed by email, so rerunning on an existing database is a no-op.
pub async fn seed_demo_accounts(db: &DatabaseConnection) -> Result<(), anyhow::Error> {
    if std::env::var("SEED_DEMO_DATA").map(|v| v != "true").unwrap_or(true) {
        return Ok(());
    }

    if !user_exists(db, "admin@ratna.local").await? {
        create_user(db, "Admin", "admin@ratna.local", "admin123", UserRole::Admin, None).await?;
    }

    if !user_exists(db, "seller@ratna.local").await? {
        let seller = create_user(
            db,
            "Demo Seller",
            "seller@ratna.local",
            "seller123",
            UserRole::Seller,
            Some("Ratna Demo Store"),
        )
        .await?;

        let now = chrono::Utc::now().naive_utc();
        let samples = [
            ("Gold-Plated Kundan Necklace", ProductCategory::Jewellery, "necklace", 2499),
            ("Banarasi Silk Saree", ProductCategory::Saree, "silk", 4999),
            ("Oxidised Silver Jhumkas", ProductCategory::Jewellery, "earrings", 799),
        ];
        for (name, category, sub_category, price) in samples {
            product::ActiveModel {
                id: Set(new_id()),
                name: Set(name.to_string()),
                category: Set(category),
                sub_category: Set(sub_category.to_string()),
                price: Set(price),
                original_price: Set(None),
                description: Set(format!("{} from the demo catalog", name)),
                images: Set(Default::default()),
                stock: Set(25),
                rating: Set(0.0),
                review_count: Set(0),
                is_featured: Set(false),
                seller_id: Set(seller.id.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }

    if !user_exists(db, "customer@ratna.local").await? {
        create_user(
            db,
            "Demo Customer",
            "customer@ratna.local",
            "customer123",
            UserRole::Customer,
            None,
        )
        .await?;
    }

    if !user_exists(db, "marketer@ratna.local").await? {
        let marketer = create_user(
            db,
            "Demo Marketer",
            "marketer@ratna.local",
            "marketer123",
            UserRole::Marketer,
            None,
        )
        .await?;

        let taken = Coupon::find()
            .filter(coupon::Column::Code.eq("SAVE10"))
            .one(db)
            .await?;
        if taken.is_none() {
            let now = chrono::Utc::now().naive_utc();
            coupon::ActiveModel {
                id: Set(new_id()),
                code: Set("SAVE10".to_string()),
                marketer_id: Set(marketer.id.clone()),
                commission_rate: Set(10.0),
                is_active: Set(true),
                usage_count: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

//! `SeaORM` Entity for marketplace accounts (admins, sellers, customers, marketers)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "User")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    /// Stored lowercase; unique index enforces one account per address
    #[sea_orm(column_type = "Text", unique)]
    pub email: String,
    /// Argon2 PHC string, never serialized to clients
    #[serde(skip_serializing)]
    #[sea_orm(column_name = "passwordHash", column_type = "Text")]
    pub password_hash: String,
    pub role: UserRole,
    /// Display name of the seller's storefront
    #[sea_orm(column_name = "storeName", column_type = "Text", nullable)]
    pub store_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub phone: Option<String>,
    /// SHA-256 hex of the pending password-reset code
    #[serde(skip_serializing)]
    #[sea_orm(column_name = "resetOtpHash", column_type = "Text", nullable)]
    pub reset_otp_hash: Option<String>,
    #[sea_orm(column_name = "resetOtpExpiresAt", nullable)]
    pub reset_otp_expires_at: Option<DateTime>,
    #[sea_orm(column_name = "addressLine1", column_type = "Text", nullable)]
    pub address_line1: Option<String>,
    #[sea_orm(column_name = "addressLine2", column_type = "Text", nullable)]
    pub address_line2: Option<String>,
    #[sea_orm(column_name = "addressCity", column_type = "Text", nullable)]
    pub address_city: Option<String>,
    #[sea_orm(column_name = "addressState", column_type = "Text", nullable)]
    pub address_state: Option<String>,
    #[sea_orm(column_name = "addressPostalCode", column_type = "Text", nullable)]
    pub address_postal_code: Option<String>,
    #[sea_orm(column_name = "addressCountry", column_type = "Text", nullable)]
    pub address_country: Option<String>,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
    #[sea_orm(has_many = "super::coupon::Entity")]
    Coupon,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
    #[sea_orm(has_many = "super::commission::Entity")]
    Commission,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupon.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::commission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Seller-facing display name, preferring the storefront name.
    pub fn display_name(&self) -> &str {
        self.store_name.as_deref().unwrap_or(&self.name)
    }
}

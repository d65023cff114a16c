//! `SeaORM` Entity for customer orders
//!
//! Line items and tracking entries live in their own tables
//! (`order_item`, `tracking_entry`); the shipping address and the payment
//! sub-record are snapshot columns on the order itself.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{OrderStatus, PaymentStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "Order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_name = "userId", column_type = "Text")]
    pub user_id: String,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    #[sea_orm(column_name = "couponCode", column_type = "Text", nullable)]
    pub coupon_code: Option<String>,
    #[sea_orm(column_name = "couponDiscount")]
    pub coupon_discount: i64,
    pub status: OrderStatus,
    #[sea_orm(column_name = "shipName", column_type = "Text", nullable)]
    pub ship_name: Option<String>,
    #[sea_orm(column_name = "shipPhone", column_type = "Text", nullable)]
    pub ship_phone: Option<String>,
    #[sea_orm(column_name = "shipLine1", column_type = "Text", nullable)]
    pub ship_line1: Option<String>,
    #[sea_orm(column_name = "shipLine2", column_type = "Text", nullable)]
    pub ship_line2: Option<String>,
    #[sea_orm(column_name = "shipCity", column_type = "Text", nullable)]
    pub ship_city: Option<String>,
    #[sea_orm(column_name = "shipState", column_type = "Text", nullable)]
    pub ship_state: Option<String>,
    #[sea_orm(column_name = "shipPostalCode", column_type = "Text", nullable)]
    pub ship_postal_code: Option<String>,
    #[sea_orm(column_name = "shipCountry", column_type = "Text", nullable)]
    pub ship_country: Option<String>,
    #[sea_orm(column_name = "paymentProvider", column_type = "Text")]
    pub payment_provider: String,
    /// Order id issued by the payment gateway
    #[sea_orm(column_name = "paymentOrderId", column_type = "Text", nullable)]
    pub payment_order_id: Option<String>,
    /// Amount forwarded to the gateway, in minor currency units
    #[sea_orm(column_name = "paymentAmount", nullable)]
    pub payment_amount: Option<i64>,
    #[sea_orm(column_name = "paymentCurrency", column_type = "Text", nullable)]
    pub payment_currency: Option<String>,
    #[sea_orm(column_name = "paymentId", column_type = "Text", nullable)]
    pub payment_id: Option<String>,
    #[sea_orm(column_name = "paymentSignature", column_type = "Text", nullable)]
    pub payment_signature: Option<String>,
    #[sea_orm(column_name = "paymentStatus")]
    pub payment_status: PaymentStatus,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
    #[sea_orm(has_many = "super::tracking_entry::Entity")]
    TrackingEntry,
    #[sea_orm(has_many = "super::commission::Entity")]
    Commission,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl Related<super::tracking_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackingEntry.def()
    }
}

impl Related<super::commission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! `SeaORM` Entity for weekly marketer commission accruals
//!
//! One row per (marketer, order) pair, created when a payment carrying that
//! marketer's coupon is verified. Immutable afterwards except for the
//! paid flag and timestamp set by the admin payout operation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "Commission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_name = "marketerId", column_type = "Text")]
    pub marketer_id: String,
    #[sea_orm(column_name = "orderId", column_type = "Text")]
    pub order_id: String,
    #[sea_orm(column_name = "couponCode", column_type = "Text")]
    pub coupon_code: String,
    /// Order total the rate was applied to
    #[sea_orm(column_name = "orderAmount")]
    pub order_amount: i64,
    /// Coupon rate at time of purchase
    #[sea_orm(column_name = "commissionRate", column_type = "Double")]
    pub commission_rate: f64,
    #[sea_orm(column_name = "commissionAmount")]
    pub commission_amount: i64,
    /// Monday 00:00:00.000 of the accrual week
    #[sea_orm(column_name = "weekStart")]
    pub week_start: DateTime,
    /// Sunday 23:59:59.999 of the accrual week
    #[sea_orm(column_name = "weekEnd")]
    pub week_end: DateTime,
    #[sea_orm(column_name = "isPaid")]
    pub is_paid: bool,
    #[sea_orm(column_name = "paidAt", nullable)]
    pub paid_at: Option<DateTime>,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::MarketerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Marketer,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marketer.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

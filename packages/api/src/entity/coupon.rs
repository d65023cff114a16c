//! `SeaORM` Entity for marketer-attributable discount/commission codes

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "Coupon")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    /// Stored uppercase; unique index enforces one owner per code
    #[sea_orm(column_type = "Text", unique)]
    pub code: String,
    #[sea_orm(column_name = "marketerId", column_type = "Text")]
    pub marketer_id: String,
    /// Percentage applied both as storefront discount and marketer commission
    #[sea_orm(column_name = "commissionRate", column_type = "Double")]
    pub commission_rate: f64,
    #[sea_orm(column_name = "isActive")]
    pub is_active: bool,
    /// Incremented once per successfully verified payment that used the code
    #[sea_orm(column_name = "usageCount")]
    pub usage_count: i64,
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
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marketer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

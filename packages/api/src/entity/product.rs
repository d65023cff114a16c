//! `SeaORM` Entity for seller-owned catalog items

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ProductCategory;

/// Image URLs stored as a JSON array alongside the row
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageList(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "Product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub category: ProductCategory,
    #[sea_orm(column_name = "subCategory", column_type = "Text")]
    pub sub_category: String,
    /// Whole-rupee price at which the item currently sells
    pub price: i64,
    #[sea_orm(column_name = "originalPrice", nullable)]
    pub original_price: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Json")]
    pub images: ImageList,
    pub stock: i64,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    #[sea_orm(column_name = "reviewCount")]
    pub review_count: i64,
    #[sea_orm(column_name = "isFeatured")]
    pub is_featured: bool,
    #[sea_orm(column_name = "sellerId", column_type = "Text")]
    pub seller_id: String,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SellerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Seller,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

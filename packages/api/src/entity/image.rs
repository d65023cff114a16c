//! `SeaORM` Entity for uploaded image metadata
//!
//! Only metadata is persisted; the bytes live with the CDN collaborator.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "Image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub filename: String,
    #[sea_orm(column_name = "originalName", column_type = "Text")]
    pub original_name: String,
    /// Public CDN URL
    #[sea_orm(column_type = "Text")]
    pub url: String,
    /// Provider-side id, never exposed in responses
    #[serde(skip_serializing)]
    #[sea_orm(column_name = "providerId", column_type = "Text")]
    pub provider_id: String,
    pub size: i64,
    #[sea_orm(column_name = "uploadedBy", column_type = "Text")]
    pub uploaded_by: String,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploadedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

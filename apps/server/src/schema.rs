use ratna_api::entity;
use ratna_api::sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

/// Create any missing tables on startup. Existing tables are left alone;
/// column migrations are handled out of band.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(entity::user::Entity),
        schema.create_table_from_entity(entity::product::Entity),
        schema.create_table_from_entity(entity::coupon::Entity),
        schema.create_table_from_entity(entity::order::Entity),
        schema.create_table_from_entity(entity::order_item::Entity),
        schema.create_table_from_entity(entity::tracking_entry::Entity),
        schema.create_table_from_entity(entity::commission::Entity),
        schema.create_table_from_entity(entity::image::Entity),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    Ok(())
}

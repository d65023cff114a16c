/// Collision-free identifier for new rows.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

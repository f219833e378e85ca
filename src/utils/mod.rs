pub mod time;

/// Fresh primary key for any table.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

use uuid::Uuid;

/// Opaque identifier for tasks and routine templates.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

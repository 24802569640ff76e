use serde::Serialize;

/// Registered patient. No uniqueness constraints; duplicates are permitted.
#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub address: String,
    pub phone: String,
}

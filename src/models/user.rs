use serde::Serialize;

use super::enums::Role;

/// Staff account. The password hash never leaves the store layer and is
/// deliberately absent here.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub created_at: String,
}

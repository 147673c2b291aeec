use super::role::Role;
use serde::Serialize;

/// A login-capable principal.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String, // argon2 PHC string
    pub role: Role,
    pub created_at: String,
}

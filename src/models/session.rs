use super::role::Role;
use serde::{Deserialize, Serialize};

/// Identity info bound to a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub account_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub login_time: String, // RFC 3339
}

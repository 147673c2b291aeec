use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Employee,
    User,
}

impl Role {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Employee => "Employee",
            Role::User => "User",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(Role::Admin),
            "Employee" => Some(Role::Employee),
            "User" => Some(Role::User),
            _ => None,
        }
    }

    /// Helper: convert input from CLI (any case)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Landing page a caller with this role is sent to.
    pub fn home(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Employee => "/attendance",
            Role::User => "/user-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

//! Unified application error type.
//! All modules (db, core, auth, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Authorization gate
    // ---------------------------
    #[error("Not authenticated: please log in")]
    Unauthenticated,

    #[error("Forbidden: {required} role required (you are {actual})")]
    Forbidden {
        required: String,
        actual: String,
        /// Landing page of the caller's own role.
        home: &'static str,
    },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    // ---------------------------
    // Matching
    // ---------------------------
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Face not recognized in the system")]
    NoMatch,

    #[error("Face comparison failed: {0}")]
    Capability(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid attendance action: {0}")]
    InvalidAction(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    // ---------------------------
    // Directory errors
    // ---------------------------
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation not allowed: {0}")]
    Protected(String),

    // ---------------------------
    // Notifications
    // ---------------------------
    #[error("Mail delivery failed: {0}")]
    Mail(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Export(e.to_string())
    }
}

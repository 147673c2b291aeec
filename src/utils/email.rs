//! Email normalization shared by every lookup and insert.

use crate::errors::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
}

/// Trim and lower-case an address, rejecting obviously malformed input.
pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !email_re().is_match(&email) {
        return Err(AppError::InvalidEmail(raw.to_string()));
    }
    Ok(email)
}

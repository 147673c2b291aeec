/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Grey placeholder for an empty time slot, plain text otherwise.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--:--:--{RESET}"),
    }
}

/// Status coloring: late in yellow, checkout-only in grey.
pub fn colorize_status(status: &str, late: bool) -> String {
    if late {
        format!("{YELLOW}{status}{RESET}")
    } else if status == crate::models::attendance::STATUS_NO_CHECKIN {
        format!("{GREY}{status}{RESET}")
    } else {
        format!("{GREEN}{status}{RESET}")
    }
}

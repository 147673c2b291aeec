use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

pub const STATUS_PRESENT: &str = "Present";
pub const STATUS_PRESENT_LATE: &str = "Present (Late)";
pub const STATUS_NO_CHECKIN: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceAction {
    CheckIn,
    CheckOut,
}

impl AttendanceAction {
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "checkin" | "check-in" | "in" => Some(Self::CheckIn),
            "checkout" | "check-out" | "out" => Some(Self::CheckOut),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceAction::CheckIn => "checkin",
            AttendanceAction::CheckOut => "checkout",
        }
    }
}

/// One row per (identity, civil date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub identity_id: i64,
    pub date: NaiveDate,            // ⇔ attendance.date (TEXT "YYYY-MM-DD")
    pub name: String,               // snapshot at first action of the day
    pub email: String,              // snapshot at first action of the day
    pub checkin: Option<NaiveTime>, // ⇔ attendance.checkin (TEXT "HH:MM:SS", NULL)
    pub checkout: Option<NaiveTime>,
    pub late: bool,
    pub status: String,
}

impl AttendanceRecord {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn checkin_str(&self) -> Option<String> {
        self.checkin.map(|t| t.format("%H:%M:%S").to_string())
    }

    pub fn checkout_str(&self) -> Option<String> {
        self.checkout.map(|t| t.format("%H:%M:%S").to_string())
    }
}

/// Status label derived from the late flag of a check-in.
pub fn present_status(late: bool) -> &'static str {
    if late {
        STATUS_PRESENT_LATE
    } else {
        STATUS_PRESENT
    }
}

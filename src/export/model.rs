// src/export/model.rs

use crate::models::attendance::AttendanceRecord;
use crate::models::identity::Identity;
use crate::utils::time::display_timestamp;
use chrono_tz::Tz;
use serde::Serialize;

/// Flat attendance row for CSV / JSON.
#[derive(Serialize, Clone, Debug)]
pub struct AttendanceExport {
    pub date: String,
    pub name: String,
    pub email: String,
    pub checkin: String,
    pub checkout: String,
    pub late: bool,
    pub status: String,
}

impl From<&AttendanceRecord> for AttendanceExport {
    fn from(r: &AttendanceRecord) -> Self {
        Self {
            date: r.date_str(),
            name: r.name.clone(),
            email: r.email.clone(),
            checkin: r.checkin_str().unwrap_or_default(),
            checkout: r.checkout_str().unwrap_or_default(),
            late: r.late,
            status: r.status.clone(),
        }
    }
}

/// Flat identity row; `created_at` rendered in the deployment timezone.
#[derive(Serialize, Clone, Debug)]
pub struct IdentityExport {
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub has_photo: bool,
}

impl IdentityExport {
    pub fn new(i: &Identity, tz: Tz) -> Self {
        Self {
            name: i.name.clone(),
            email: i.email.clone(),
            created_at: display_timestamp(&i.created_at, tz),
            has_photo: i.has_reference(),
        }
    }
}

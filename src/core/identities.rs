use crate::core::accounts::require_name;
use crate::db::identities;
use crate::db::log::ttlog;
use crate::errors::{AppError, AppResult};
use crate::faces::LivePhoto;
use crate::faces::scanner::check_photo;
use crate::models::identity::Identity;
use crate::utils::email::normalize_email;
use crate::utils::time::civil_timestamp;
use chrono_tz::Tz;
use rusqlite::Connection;

/// Registered employees and their reference photos.
pub struct IdentityLogic;

impl IdentityLogic {
    /// An identity without a photo is stored but never matched. A reference
    /// photo must pass the same checks as a live one.
    pub fn register(
        conn: &Connection,
        name: &str,
        email: &str,
        photo: Option<&LivePhoto>,
        min_bytes: usize,
        tz: Tz,
    ) -> AppResult<i64> {
        let name = require_name(name)?;
        let email = normalize_email(email)?;
        if let Some(p) = photo {
            check_photo(p, min_bytes)?;
        }

        let id = identities::insert_identity(
            conn,
            name,
            &email,
            photo.map(|p| p.bytes),
            &civil_timestamp(tz),
        )?;
        ttlog(conn, "register", &email, &format!("Identity #{id} registered ({name})"))?;
        Ok(id)
    }

    pub fn update(
        conn: &Connection,
        id: i64,
        name: Option<&str>,
        email: Option<&str>,
        photo: Option<&LivePhoto>,
        min_bytes: usize,
    ) -> AppResult<Identity> {
        let name = name.map(require_name).transpose()?;
        let email = email.map(normalize_email).transpose()?;
        if let Some(p) = photo {
            check_photo(p, min_bytes)?;
        }

        let changed =
            identities::update_identity(conn, id, name, email.as_deref(), photo.map(|p| p.bytes))?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("identity #{id}")));
        }

        let updated = identities::find_by_id(conn, id)?
            .ok_or_else(|| AppError::NotFound(format!("identity #{id}")))?;
        ttlog(conn, "identity_update", &updated.email, &format!("Identity #{id} updated"))?;
        Ok(updated)
    }

    /// Removes the listed identities; unknown ids are reported, not fatal.
    /// Attendance history is kept.
    pub fn remove(conn: &Connection, ids: &[i64]) -> AppResult<(Vec<Identity>, Vec<i64>)> {
        let mut removed = Vec::new();
        let mut missing = Vec::new();

        for &id in ids {
            match identities::find_by_id(conn, id)? {
                Some(identity) => {
                    identities::delete_identity(conn, id)?;
                    ttlog(conn, "identity_remove", &identity.email, &format!("Identity #{id} removed"))?;
                    removed.push(identity);
                }
                None => missing.push(id),
            }
        }
        Ok((removed, missing))
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<Identity>> {
        identities::load_identities(conn)
    }
}

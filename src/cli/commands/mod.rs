pub mod account;
pub mod attend;
pub mod config;
pub mod db;
pub mod export;
pub mod identity;
pub mod init;
pub mod log;
pub mod records;
pub mod session;

use crate::auth::{AuthGate, SqliteSessionStore};
use crate::config::Config;
use crate::core::accounts::AccountLogic;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::faces::LivePhoto;
use crate::models::role::Role;
use crate::models::session::SessionInfo;
use crate::utils::path::expand_tilde;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// Open the configured database with the schema up to date and the
/// default accounts in place.
pub(crate) fn open_db(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    if cfg.seed_defaults {
        AccountLogic::seed_defaults(&pool.conn, cfg.tz()?)?;
    }
    Ok(pool)
}

/// Resolve the caller's session and check the role.
pub(crate) fn require(
    conn: &Connection,
    token: Option<&str>,
    role: Option<Role>,
) -> AppResult<SessionInfo> {
    let store = SqliteSessionStore::new(conn);
    AuthGate::new(&store).authorize(token, role)
}

/// Photo bytes read from disk plus the content type the caller declares
/// (guessed from the extension otherwise).
pub(crate) struct PhotoFile {
    bytes: Vec<u8>,
    content_type: String,
}

impl PhotoFile {
    pub(crate) fn read(path: &Path, content_type: Option<&str>) -> AppResult<Self> {
        let path = expand_tilde(path);
        let bytes = fs::read(&path)
            .map_err(|e| AppError::InvalidImage(format!("{}: {e}", path.display())))?;
        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => mime_guess::from_path(&path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };
        Ok(Self {
            bytes,
            content_type,
        })
    }

    pub(crate) fn as_live(&self) -> LivePhoto<'_> {
        LivePhoto {
            bytes: &self.bytes,
            content_type: &self.content_type,
        }
    }
}

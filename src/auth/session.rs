//! Token → session info stores.

use crate::db::sessions;
use crate::errors::AppResult;
use crate::models::session::SessionInfo;
use dashmap::DashMap;
use rand::RngCore;
use rand::rngs::OsRng;
use rusqlite::Connection;

const TOKEN_BYTES: usize = 32;

/// Fresh unguessable token: 32 bytes from the OS RNG, hex encoded.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Owner of the session lifecycle.
///
/// `revoke` on an unknown token is a no-op. Sessions never expire on their own.
pub trait SessionStore {
    fn create(&self, info: SessionInfo) -> AppResult<String>;
    fn resolve(&self, token: &str) -> AppResult<Option<SessionInfo>>;
    fn revoke(&self, token: &str) -> AppResult<()>;
}

/// Process-lifetime store; a restart clears every session.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionInfo>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, info: SessionInfo) -> AppResult<String> {
        let token = generate_token();
        self.sessions.insert(token.clone(), info);
        Ok(token)
    }

    fn resolve(&self, token: &str) -> AppResult<Option<SessionInfo>> {
        Ok(self.sessions.get(token).map(|s| s.value().clone()))
    }

    fn revoke(&self, token: &str) -> AppResult<()> {
        self.sessions.remove(token);
        Ok(())
    }
}

/// Sessions kept in the `sessions` table, shared by every process
/// that opens the same database.
pub struct SqliteSessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SessionStore for SqliteSessionStore<'_> {
    fn create(&self, info: SessionInfo) -> AppResult<String> {
        let token = generate_token();
        sessions::insert_session(self.conn, &token, &info)?;
        Ok(token)
    }

    fn resolve(&self, token: &str) -> AppResult<Option<SessionInfo>> {
        sessions::find_session(self.conn, token)
    }

    fn revoke(&self, token: &str) -> AppResult<()> {
        sessions::delete_session(self.conn, token)?;
        Ok(())
    }
}

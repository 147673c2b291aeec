use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::models::session::SessionInfo;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn map_row(row: &Row) -> Result<SessionInfo> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidRole(role_str.clone())),
        )
    })?;

    Ok(SessionInfo {
        account_id: row.get("account_id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        role,
        login_time: row.get("login_time")?,
    })
}

pub fn insert_session(conn: &Connection, token: &str, info: &SessionInfo) -> AppResult<()> {
    conn.execute(
        "INSERT INTO sessions (token, account_id, email, name, role, login_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            token,
            info.account_id,
            info.email,
            info.name,
            info.role.to_db_str(),
            info.login_time,
        ],
    )?;
    Ok(())
}

pub fn find_session(conn: &Connection, token: &str) -> AppResult<Option<SessionInfo>> {
    let found = conn
        .query_row(
            "SELECT account_id, email, name, role, login_time
             FROM sessions WHERE token = ?1",
            [token],
            map_row,
        )
        .optional()?;
    Ok(found)
}

pub fn delete_session(conn: &Connection, token: &str) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?)
}

/// Drop every session of an account (role change, removal).
pub fn delete_sessions_for(conn: &Connection, account_id: i64) -> AppResult<usize> {
    Ok(conn.execute(
        "DELETE FROM sessions WHERE account_id = ?1",
        [account_id],
    )?)
}

/// Rewrite the name and email snapshot held by the account's sessions.
pub fn refresh_sessions_for(
    conn: &Connection,
    account_id: i64,
    name: &str,
    email: &str,
) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE sessions SET name = ?2, email = ?3 WHERE account_id = ?1",
        params![account_id, name, email],
    )?)
}

pub fn count_sessions(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?)
}

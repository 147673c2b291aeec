use crate::db::identities::map_unique;
use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::role::Role;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub fn map_row(row: &Row) -> Result<Account> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidRole(role_str.clone())),
        )
    })?;

    Ok(Account {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_account(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    created_at: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO accounts (name, email, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, email, password_hash, role.to_db_str(), created_at],
    )
    .map_err(|e| map_unique(e, email))?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<Account>> {
    let found = conn
        .query_row(
            "SELECT id, name, email, password_hash, role, created_at
             FROM accounts WHERE email = ?1",
            [email],
            map_row,
        )
        .optional()?;
    Ok(found)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<Account>> {
    let found = conn
        .query_row(
            "SELECT id, name, email, password_hash, role, created_at
             FROM accounts WHERE id = ?1",
            [id],
            map_row,
        )
        .optional()?;
    Ok(found)
}

pub fn load_accounts(conn: &Connection) -> AppResult<Vec<Account>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, email, password_hash, role, created_at
         FROM accounts
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_accounts(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM accounts", [], |r| r.get(0))?)
}

pub fn count_by_role(conn: &Connection, role: Role) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM accounts WHERE role = ?1",
        [role.to_db_str()],
        |r| r.get(0),
    )?)
}

/// Partial update: `None` fields keep their stored value.
pub fn update_account(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
    role: Option<Role>,
) -> AppResult<usize> {
    let changed = conn
        .execute(
            "UPDATE accounts
             SET name          = COALESCE(?2, name),
                 email         = COALESCE(?3, email),
                 password_hash = COALESCE(?4, password_hash),
                 role          = COALESCE(?5, role)
             WHERE id = ?1",
            params![id, name, email, password_hash, role.map(|r| r.to_db_str())],
        )
        .map_err(|e| map_unique(e, email.unwrap_or_default()))?;
    Ok(changed)
}

pub fn delete_account(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM accounts WHERE id = ?1", [id])?)
}

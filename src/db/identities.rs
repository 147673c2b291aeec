use crate::errors::{AppError, AppResult};
use crate::models::identity::Identity;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result, Row, params};

pub fn map_row(row: &Row) -> Result<Identity> {
    Ok(Identity {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        reference_image: row.get("reference_image")?,
        created_at: row.get("created_at")?,
    })
}

/// Unique-constraint violations surface as `DuplicateEmail`.
pub(crate) fn map_unique(e: rusqlite::Error, email: &str) -> AppError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => {
            AppError::DuplicateEmail(email.to_string())
        }
        _ => AppError::Db(e),
    }
}

pub fn insert_identity(
    conn: &Connection,
    name: &str,
    email: &str,
    reference_image: Option<&[u8]>,
    created_at: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO identities (name, email, reference_image, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, email, reference_image, created_at],
    )
    .map_err(|e| map_unique(e, email))?;
    Ok(conn.last_insert_rowid())
}

/// All identities in insertion order (the matching order).
pub fn load_identities(conn: &Connection) -> AppResult<Vec<Identity>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, email, reference_image, created_at
         FROM identities
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<Identity>> {
    let found = conn
        .query_row(
            "SELECT id, name, email, reference_image, created_at
             FROM identities WHERE email = ?1",
            [email],
            map_row,
        )
        .optional()?;
    Ok(found)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<Identity>> {
    let found = conn
        .query_row(
            "SELECT id, name, email, reference_image, created_at
             FROM identities WHERE id = ?1",
            [id],
            map_row,
        )
        .optional()?;
    Ok(found)
}

/// Partial update: `None` fields keep their stored value.
pub fn update_identity(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    email: Option<&str>,
    reference_image: Option<&[u8]>,
) -> AppResult<usize> {
    let changed = conn
        .execute(
            "UPDATE identities
             SET name            = COALESCE(?2, name),
                 email           = COALESCE(?3, email),
                 reference_image = COALESCE(?4, reference_image)
             WHERE id = ?1",
            params![id, name, email, reference_image],
        )
        .map_err(|e| map_unique(e, email.unwrap_or_default()))?;
    Ok(changed)
}

pub fn delete_identity(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM identities WHERE id = ?1", [id])?)
}

use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceRecord;
use crate::utils::time::TIME_FMT;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params, params_from_iter};

const COLUMNS: &str = "id, identity_id, date, name, email, checkin, checkout, late, status";

fn conversion_error(e: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_slot(raw: Option<String>) -> Result<Option<NaiveTime>> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveTime::parse_from_str(&s, TIME_FMT)
            .map(Some)
            .map_err(|_| conversion_error(AppError::InvalidTime(s))),
    }
}

pub fn map_row(row: &Row) -> Result<AttendanceRecord> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(AppError::InvalidDate(date_str.clone())))?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        identity_id: row.get("identity_id")?,
        date,
        name: row.get("name")?,
        email: row.get("email")?,
        checkin: parse_slot(row.get("checkin")?)?,
        checkout: parse_slot(row.get("checkout")?)?,
        late: row.get::<_, i32>("late")? == 1,
        status: row.get("status")?,
    })
}

fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn fmt_slot(t: Option<NaiveTime>) -> Option<String> {
    t.map(|t| t.format(TIME_FMT).to_string())
}

/// The (identity, date) record, if one exists.
pub fn find_record(
    conn: &Connection,
    identity_id: i64,
    date: NaiveDate,
) -> AppResult<Option<AttendanceRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM attendance WHERE identity_id = ?1 AND date = ?2");
    let found = conn
        .query_row(&sql, params![identity_id, fmt_date(date)], map_row)
        .optional()?;
    Ok(found)
}

pub fn insert_record(conn: &Connection, rec: &AttendanceRecord) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO attendance (identity_id, date, name, email, checkin, checkout, late, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            rec.identity_id,
            fmt_date(rec.date),
            rec.name,
            rec.email,
            fmt_slot(rec.checkin),
            fmt_slot(rec.checkout),
            if rec.late { 1 } else { 0 },
            rec.status,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrite the mutable fields of an existing record.
pub fn update_record(conn: &Connection, rec: &AttendanceRecord) -> AppResult<usize> {
    let changed = conn.execute(
        "UPDATE attendance
         SET checkin = ?2, checkout = ?3, late = ?4, status = ?5
         WHERE id = ?1",
        params![
            rec.id,
            fmt_slot(rec.checkin),
            fmt_slot(rec.checkout),
            if rec.late { 1 } else { 0 },
            rec.status,
        ],
    )?;
    Ok(changed)
}

/// Records newest date first; rows of the same date by name.
///
/// `range` bounds are inclusive.
pub fn load_records(
    conn: &Connection,
    range: Option<(NaiveDate, NaiveDate)>,
    name: Option<&str>,
) -> AppResult<Vec<AttendanceRecord>> {
    let mut sql = format!("SELECT {COLUMNS} FROM attendance WHERE 1 = 1");
    let mut args: Vec<String> = Vec::new();

    if let Some((from, to)) = range {
        sql.push_str(&format!(
            " AND date BETWEEN ?{} AND ?{}",
            args.len() + 1,
            args.len() + 2
        ));
        args.push(fmt_date(from));
        args.push(fmt_date(to));
    }
    if let Some(n) = name {
        sql.push_str(&format!(" AND name = ?{}", args.len() + 1));
        args.push(n.to_string());
    }
    sql.push_str(" ORDER BY date DESC, name ASC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_all(conn: &Connection) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM attendance", [])?)
}

pub fn delete_by_date(conn: &Connection, date: NaiveDate) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM attendance WHERE date = ?1", [fmt_date(date)])?)
}

pub fn delete_by_name(conn: &Connection, name: &str) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM attendance WHERE name = ?1", [name])?)
}

pub fn delete_by_ids(conn: &Connection, ids: &[i64]) -> AppResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let placeholders = (1..=ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("DELETE FROM attendance WHERE id IN ({placeholders})");
    Ok(conn.execute(&sql, params_from_iter(ids.iter()))?)
}

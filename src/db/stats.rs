use crate::db::{accounts, sessions};
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::{Connection, OptionalExtension};
use std::fs;

/// Counters shown by `db --info`.
#[derive(Debug, Default, PartialEq)]
pub struct DbStats {
    pub identities: i64,
    pub identities_without_photo: i64,
    pub accounts: i64,
    pub sessions: i64,
    pub records: i64,
    pub late_records: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

fn count(conn: &Connection, sql: &str) -> rusqlite::Result<i64> {
    conn.query_row(sql, [], |row| row.get(0))
}

pub fn collect(conn: &Connection) -> AppResult<DbStats> {
    Ok(DbStats {
        identities: count(conn, "SELECT COUNT(*) FROM identities")?,
        identities_without_photo: count(
            conn,
            "SELECT COUNT(*) FROM identities WHERE reference_image IS NULL OR length(reference_image) = 0",
        )?,
        accounts: accounts::count_accounts(conn)?,
        sessions: sessions::count_sessions(conn)?,
        records: count(conn, "SELECT COUNT(*) FROM attendance")?,
        late_records: count(conn, "SELECT COUNT(*) FROM attendance WHERE late = 1")?,
        first_date: conn
            .query_row("SELECT MIN(date) FROM attendance", [], |row| row.get(0))
            .optional()?
            .flatten(),
        last_date: conn
            .query_row("SELECT MAX(date) FROM attendance", [], |row| row.get(0))
            .optional()?
            .flatten(),
    })
}

pub fn print_db_info(conn: &Connection, db_path: &str) -> AppResult<()> {
    let stats = collect(conn)?;
    println!();

    //
    // 1) FILE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) DIRECTORY
    //
    println!(
        "{}• Identities:{} {}{}{} ({} without photo)",
        CYAN, RESET, GREEN, stats.identities, RESET, stats.identities_without_photo
    );
    println!("{}• Accounts:{} {}{}{}", CYAN, RESET, GREEN, stats.accounts, RESET);
    println!("{}• Open sessions:{} {}", CYAN, RESET, stats.sessions);

    //
    // 3) ATTENDANCE
    //
    println!(
        "{}• Attendance records:{} {}{}{} ({} late)",
        CYAN, RESET, GREEN, stats.records, RESET, stats.late_records
    );

    let placeholder = format!("{GREY}--{RESET}");
    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", stats.first_date.as_deref().unwrap_or(&placeholder));
    println!("    to:   {}", stats.last_date.as_deref().unwrap_or(&placeholder));

    println!();
    Ok(())
}

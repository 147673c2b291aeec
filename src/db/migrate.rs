use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists; applied migrations are recorded there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare_cached(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Directory collections: identities (reference photos) and accounts.
fn create_directory_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS identities (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            name             TEXT NOT NULL,
            email            TEXT NOT NULL UNIQUE,
            reference_image  BLOB,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS accounts (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL,
            email          TEXT NOT NULL UNIQUE,
            password_hash  TEXT NOT NULL,
            role           TEXT NOT NULL CHECK (role IN ('Admin','Employee','User')),
            created_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_accounts_role ON accounts(role);
        "#,
    )?;
    Ok(())
}

/// Daily attendance: one row per (identity_id, date).
///
/// No foreign key to `identities`: records outlive a deleted identity.
fn create_attendance_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            identity_id  INTEGER NOT NULL,
            date         TEXT NOT NULL,          -- YYYY-MM-DD (civil timezone)
            name         TEXT NOT NULL,
            email        TEXT NOT NULL,
            checkin      TEXT,                   -- HH:MM:SS
            checkout     TEXT,                   -- HH:MM:SS
            late         INTEGER NOT NULL DEFAULT 0,
            status       TEXT NOT NULL DEFAULT '-',
            UNIQUE (identity_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date);
        CREATE INDEX IF NOT EXISTS idx_attendance_name ON attendance(name);
        "#,
    )?;
    Ok(())
}

fn create_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            account_id  INTEGER NOT NULL,
            email       TEXT NOT NULL,
            name        TEXT NOT NULL,
            role        TEXT NOT NULL,
            login_time  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

type Step = fn(&Connection) -> Result<()>;

const MIGRATIONS: &[(&str, &str, Step)] = &[
    (
        "20250301_0001_directory",
        "Created identities and accounts tables",
        create_directory_tables,
    ),
    (
        "20250301_0002_attendance",
        "Created attendance table keyed by (identity_id, date)",
        create_attendance_table,
    ),
    (
        "20250412_0003_sessions",
        "Created sessions table",
        create_sessions_table,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Each step runs in its own transaction together with its log marker.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for (version, message, step) in MIGRATIONS {
        if is_applied(conn, version)? {
            continue;
        }

        conn.execute_batch("BEGIN IMMEDIATE;")?;
        let applied = step(conn).and_then(|_| mark_applied(conn, version, message));
        match applied {
            Ok(()) => conn.execute_batch("COMMIT;")?,
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK;");
                return Err(e);
            }
        }

        tracing::debug!(version, "migration applied");
        success(format!("Migration applied: {} → {}", version, message));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[test]
    fn attendance_key_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        let insert = "INSERT INTO attendance (identity_id, date, name, email, status)
                      VALUES (1, '2025-03-03', 'Alice', 'alice@example.com', '-')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}

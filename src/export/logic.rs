// src/export/logic.rs

use crate::core::records::RecordsLogic;
use crate::db::identities::load_identities;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv;
use crate::export::model::{AttendanceExport, IdentityExport};
use crate::export::{ExportFormat, ExportTarget};
use crate::ui::messages::warning;
use chrono_tz::Tz;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

/// High-level export entry point.
pub struct ExportLogic;

impl ExportLogic {
    /// Export one collection to `file` (absolute path).
    ///
    /// `range` filters attendance by date: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`,
    /// ranges `start:end` in the same format, or `all`. It is ignored for
    /// identities. Returns the number of exported rows.
    pub fn export(
        conn: &Connection,
        target: ExportTarget,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
        tz: Tz,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        ensure_writable(path, force)?;

        match target {
            ExportTarget::Attendance => {
                let rows: Vec<AttendanceExport> = RecordsLogic::list(conn, range, None)?
                    .iter()
                    .map(AttendanceExport::from)
                    .collect();
                write_rows(&rows, format, path, "No attendance records found for selected range.")
            }
            ExportTarget::Identities => {
                let rows: Vec<IdentityExport> = load_identities(conn)?
                    .iter()
                    .map(|i| IdentityExport::new(i, tz))
                    .collect();
                write_rows(&rows, format, path, "No registered identities.")
            }
        }
    }
}

fn write_rows<T: Serialize>(
    rows: &[T],
    format: ExportFormat,
    path: &Path,
    empty_msg: &str,
) -> AppResult<usize> {
    if rows.is_empty() {
        warning(empty_msg);
        return Ok(0);
    }

    json_csv::write_rows(rows, format, path)?;
    tracing::debug!(rows = rows.len(), format = format.as_str(), path = %path.display(), "export written");
    Ok(rows.len())
}

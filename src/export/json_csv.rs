// src/export/json_csv.rs

use crate::errors::AppResult;
use crate::export::{ExportFormat, notify_export_success};
use crate::ui::messages::info;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serialize `rows` to `path`; CSV headers come from the field names.
pub(crate) fn write_rows<T: Serialize>(rows: &[T], format: ExportFormat, path: &Path) -> AppResult<()> {
    let label = format.as_str().to_uppercase();
    info(format!("Exporting to {label}: {}", path.display()));

    match format {
        ExportFormat::Json => {
            let mut out = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut out, rows)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_path(path)?;
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
    }

    notify_export_success(&label, path);
    Ok(())
}

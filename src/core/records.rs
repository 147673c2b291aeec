use crate::db::attendance;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::models::attendance::AttendanceRecord;
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::date::parse_period;
use crate::utils::table::Table;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Bulk deletion filters.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    All,
    Date(NaiveDate),
    Name(String),
    Ids(Vec<i64>),
}

impl RecordFilter {
    fn describe(&self) -> String {
        match self {
            RecordFilter::All => "all records".to_string(),
            RecordFilter::Date(d) => format!("date {}", d.format("%Y-%m-%d")),
            RecordFilter::Name(n) => format!("name '{n}'"),
            RecordFilter::Ids(ids) => format!("ids {ids:?}"),
        }
    }
}

pub struct RecordsLogic;

impl RecordsLogic {
    /// Newest date first. `period` accepts the `YYYY[-MM[-DD]][:...]` forms.
    pub fn list(
        conn: &Connection,
        period: Option<&str>,
        name: Option<&str>,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let range = match period {
            None => None,
            Some(p) if p.eq_ignore_ascii_case("all") => None,
            Some(p) => Some(parse_period(p)?),
        };
        attendance::load_records(conn, range, name)
    }

    pub fn delete(conn: &Connection, filter: &RecordFilter) -> AppResult<usize> {
        let removed = match filter {
            RecordFilter::All => attendance::delete_all(conn)?,
            RecordFilter::Date(d) => attendance::delete_by_date(conn, *d)?,
            RecordFilter::Name(n) => attendance::delete_by_name(conn, n)?,
            RecordFilter::Ids(ids) => attendance::delete_by_ids(conn, ids)?,
        };
        ttlog(
            conn,
            "records_delete",
            &filter.describe(),
            &format!("{removed} attendance record(s) deleted"),
        )?;
        Ok(removed)
    }

    pub fn render(records: &[AttendanceRecord]) -> String {
        let mut table = Table::new(&["ID", "DATE", "NAME", "EMAIL", "CHECK-IN", "CHECK-OUT", "STATUS"]);
        for r in records {
            table.add_row(vec![
                r.id.to_string(),
                r.date_str(),
                r.name.clone(),
                r.email.clone(),
                colorize_optional(r.checkin_str().as_deref()),
                colorize_optional(r.checkout_str().as_deref()),
                colorize_status(&r.status, r.late),
            ]);
        }
        table.render()
    }
}

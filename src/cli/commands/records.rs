use crate::cli::commands::{open_db, require};
use crate::cli::parser::{Cli, Commands, RecordsCmd};
use crate::config::Config;
use crate::core::records::{RecordFilter, RecordsLogic};
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::ui::messages::{info, success};
use crate::utils::date::parse_date;

fn filter_from(
    all: bool,
    date: Option<&str>,
    name: Option<&str>,
    ids: &[i64],
) -> AppResult<RecordFilter> {
    if all {
        return Ok(RecordFilter::All);
    }
    if let Some(d) = date {
        return parse_date(d)
            .map(RecordFilter::Date)
            .ok_or_else(|| AppError::InvalidDate(d.to_string()));
    }
    if let Some(n) = name {
        return Ok(RecordFilter::Name(n.to_string()));
    }
    if !ids.is_empty() {
        return Ok(RecordFilter::Ids(ids.to_vec()));
    }
    Err(AppError::Other(
        "choose what to delete: --all, --date, --name or --ids".into(),
    ))
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Records { action } = &cli.command else {
        return Ok(());
    };

    let pool = open_db(cfg)?;
    let conn = &pool.conn;
    require(conn, cli.token.as_deref(), Some(Role::Admin))?;

    match action {
        RecordsCmd::List { period, name, json } => {
            let records = RecordsLogic::list(conn, period.as_deref(), name.as_deref())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                info("No attendance records found.");
            } else {
                println!("{}", RecordsLogic::render(&records));
            }
        }

        RecordsCmd::Delete {
            all,
            date,
            name,
            ids,
        } => {
            let filter = filter_from(*all, date.as_deref(), name.as_deref(), ids)?;
            let removed = RecordsLogic::delete(conn, &filter)?;
            success(format!("{removed} attendance record(s) deleted"));
        }
    }

    Ok(())
}

use crate::db::log::{LogEntry, load_log};
use crate::errors::AppResult;
use crate::utils::table::strip_ansi;
use crate::utils::time::display_timestamp;
use ansi_term::Colour;
use chrono_tz::Tz;
use rusqlite::Connection;

const OP_WIDTH_MAX: usize = 60;

/// ANSI color for an audit operation.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "checkin" | "register" | "account_add" => Colour::Green,
        "checkout" => Colour::Cyan,
        "records_delete" | "identity_remove" | "account_remove" => Colour::Red,
        "identity_update" | "account_update" => Colour::Yellow,
        "login" | "logout" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" | "seed" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

fn truncate_visible(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

pub struct LogLogic;

impl LogLogic {
    /// One formatted line per entry, timestamps shown in `tz`.
    pub fn format_entries(entries: &[LogEntry], tz: Tz) -> Vec<String> {
        let op_targets: Vec<String> = entries
            .iter()
            .map(|e| {
                if e.target.is_empty() {
                    e.operation.clone()
                } else {
                    format!("{} ({})", e.operation, e.target)
                }
            })
            .collect();

        let op_w = op_targets
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_MAX);
        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);

        entries
            .iter()
            .zip(op_targets)
            .map(|(e, op_target)| {
                let color = color_for_operation(&e.operation);
                let visible = truncate_visible(&op_target, OP_WIDTH_MAX);

                // only the operation word keeps its color
                let colored = match visible.split_once(' ') {
                    Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                    None => color.paint(visible.as_str()).to_string(),
                };
                let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&colored).chars().count()));

                format!(
                    "{:>id_w$}: {} | {}{} => {}",
                    e.id,
                    display_timestamp(&e.date, tz),
                    colored,
                    padding,
                    e.message,
                )
            })
            .collect()
    }

    pub fn print_log(conn: &Connection, tz: Tz) -> AppResult<()> {
        let entries = load_log(conn)?;

        println!("📜 Internal log:\n");
        for line in Self::format_entries(&entries, tz) {
            println!("{line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_aligned_and_localized() {
        let entries = vec![
            LogEntry {
                id: 1,
                date: "2025-03-03T03:59:59+00:00".into(),
                operation: "checkin".into(),
                target: "alice@example.com 2025-03-03".into(),
                message: "checkin 08:59:59 late=false".into(),
            },
            LogEntry {
                id: 12,
                date: "2025-03-03T13:00:00+00:00".into(),
                operation: "logout".into(),
                target: String::new(),
                message: "session closed".into(),
            },
        ];

        let lines: Vec<String> = LogLogic::format_entries(&entries, chrono_tz::Asia::Karachi)
            .iter()
            .map(|l| strip_ansi(l))
            .collect();

        assert_eq!(
            lines[0],
            " 1: 2025-03-03 08:59:59 | checkin (alice@example.com 2025-03-03) => checkin 08:59:59 late=false"
        );
        assert!(lines[1].starts_with("12: 2025-03-03 18:00:00 | logout"));
        assert_eq!(lines[0].find("=>"), lines[1].find("=>"));
    }
}

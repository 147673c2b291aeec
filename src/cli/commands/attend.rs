use crate::auth::{AuthGate, SqliteSessionStore};
use crate::cli::commands::{PhotoFile, open_db};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::attend::AttendanceDesk;
use crate::core::recorder::AttendanceRecorder;
use crate::errors::{AppError, AppResult};
use crate::faces::{FaceMatchScanner, ThumbnailComparer};
use crate::models::attendance::AttendanceAction;
use crate::notify::{
    DisabledNotifier, LateNotifier, MailTransport, NotificationDispatcher, NotificationWorker,
    SmtpTransport, SpoolTransport,
};
use crate::ui::messages::{success, warning};
use crate::utils::path::expand_tilde;
use crate::utils::time::civil_now;
use chrono::NaiveDateTime;
use rusqlite::Connection;

/// Late notifier for this run: a background worker relaying mail when
/// notifications are on, otherwise a no-op. SMTP wins over the spool.
fn build_notifier(cfg: &Config) -> AppResult<Box<dyn LateNotifier>> {
    if !cfg.notify.enabled {
        return Ok(Box::new(DisabledNotifier));
    }

    let spool = cfg.notify.spool_dir.as_deref().filter(|d| !d.trim().is_empty());
    let transport: Box<dyn MailTransport> = match (&cfg.notify.smtp, spool) {
        (Some(smtp), _) => Box::new(SmtpTransport::new(smtp)),
        (None, Some(dir)) => Box::new(SpoolTransport::new(expand_tilde(dir), cfg.tz()?)),
        (None, None) => {
            warning("Notifications enabled but neither smtp nor spool_dir configured; late notices are skipped");
            return Ok(Box::new(DisabledNotifier));
        }
    };

    let dispatcher = NotificationDispatcher::new(transport, cfg.notify.from.clone());
    Ok(Box::new(NotificationWorker::spawn(dispatcher)?))
}

/// Clock reading "YYYY-MM-DD HH:MM:SS" honored by debug builds only.
pub const CLOCK_ENV: &str = "RATT_CLOCK";

/// Debug builds let an admin session pin the clock through `RATT_CLOCK`;
/// release builds always use the civil clock.
#[cfg(debug_assertions)]
fn clock_override(conn: &Connection, token: Option<&str>) -> AppResult<Option<NaiveDateTime>> {
    use crate::cli::commands::require;
    use crate::models::role::Role;
    use crate::utils::time::parse_datetime;

    let Ok(raw) = std::env::var(CLOCK_ENV) else {
        return Ok(None);
    };
    let caller = require(conn, token, Some(Role::Admin))?;
    tracing::warn!(clock = %raw, operator = %caller.email, "clock override in effect");
    parse_datetime(&raw).map(Some)
}

#[cfg(not(debug_assertions))]
fn clock_override(_conn: &Connection, _token: Option<&str>) -> AppResult<Option<NaiveDateTime>> {
    Ok(None)
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Attend {
        action,
        photo,
        content_type,
        policy,
    } = &cli.command
    {
        let action = AttendanceAction::from_code(action)
            .ok_or_else(|| AppError::InvalidAction(action.clone()))?;
        let photo = PhotoFile::read(photo, content_type.as_deref())?;

        let pool = open_db(cfg)?;
        let conn = &pool.conn;
        let now = match clock_override(conn, cli.token.as_deref())? {
            Some(pinned) => pinned,
            None => civil_now(cfg.tz()?),
        };

        let store = SqliteSessionStore::new(conn);
        let comparer = ThumbnailComparer::new(cfg.face_threshold);
        let notifier = build_notifier(cfg)?;

        let report = {
            let desk = AttendanceDesk::new(
                AuthGate::new(&store),
                FaceMatchScanner::new(
                    &comparer,
                    policy.unwrap_or(cfg.match_policy),
                    cfg.min_image_bytes,
                ),
                AttendanceRecorder::new(cfg.cutoff()?, notifier.as_ref()),
            );
            desk.handle(conn, cli.token.as_deref(), &photo.as_live(), action, now)
        };

        // waits for queued notices before the process exits
        drop(notifier);

        let report = report?;
        if report.outcome.is_late() {
            warning(report.message());
        } else {
            success(report.message());
        }
        tracing::debug!(distance = report.distance, "matched");
    }

    Ok(())
}

use crate::cli::commands::{open_db, require};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::models::role::Role;
use crate::ui::messages::info;

/// Handle the `export` command
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        what,
        format,
        file,
        range,
        force,
    } = &cli.command
    {
        let pool = open_db(cfg)?;
        require(&pool.conn, cli.token.as_deref(), Some(Role::Admin))?;

        let rows = ExportLogic::export(
            &pool.conn,
            *what,
            *format,
            file,
            range.as_deref(),
            *force,
            cfg.tz()?,
        )?;
        if rows > 0 {
            info(format!("{rows} row(s) exported"));
        }
    }

    Ok(())
}

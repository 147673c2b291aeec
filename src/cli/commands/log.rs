use crate::cli::commands::{open_db, require};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::errors::AppResult;
use crate::models::role::Role;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if matches!(cli.command, Commands::Log { print: true }) {
        let pool = open_db(cfg)?;
        require(&pool.conn, cli.token.as_deref(), Some(Role::Admin))?;
        LogLogic::print_log(&pool.conn, cfg.tz()?)?;
    }

    Ok(())
}

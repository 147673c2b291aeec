use crate::auth::{AuthGate, SqliteSessionStore};
use crate::cli::commands::{open_db, require};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::time::{civil_timestamp, display_timestamp};

/// `login`, `logout` and `whoami`.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let pool = open_db(cfg)?;
    let conn = &pool.conn;
    let tz = cfg.tz()?;

    match &cli.command {
        Commands::Login {
            email,
            password,
            raw,
        } => {
            let store = SqliteSessionStore::new(conn);
            let gate = AuthGate::new(&store);
            let (token, who) = gate
                .login(conn, email, password, civil_timestamp(tz))
                .inspect_err(|e| tracing::info!(email = %email, error = %e, "login rejected"))?;
            ttlog(conn, "login", &who.email, &format!("Session opened as {}", who.role))?;

            if *raw {
                println!("{token}");
            } else {
                success(format!("Logged in as {} ({})", who.name, who.role));
                println!("Token: {token}");
                info(format!("Landing page: {}", who.role.home()));
                info("Pass it with --token or export RATT_SESSION");
            }
        }

        Commands::Logout => {
            let who = require(conn, cli.token.as_deref(), None)?;
            let store = SqliteSessionStore::new(conn);
            if let Some(token) = cli.token.as_deref() {
                AuthGate::new(&store).logout(token)?;
            }
            ttlog(conn, "logout", &who.email, "Session closed")?;
            success(format!("Logged out {}", who.email));
        }

        Commands::Whoami => {
            let who = require(conn, cli.token.as_deref(), None)?;
            println!("Name:  {}", who.name);
            println!("Email: {}", who.email);
            println!("Role:  {}", who.role);
            println!("Since: {}", display_timestamp(&who.login_time, tz));
            println!("Home:  {}", who.role.home());
        }

        _ => {}
    }

    Ok(())
}

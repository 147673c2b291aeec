use crate::cli::commands::{open_db, require};
use crate::cli::parser::{AccountCmd, Cli, Commands};
use crate::config::Config;
use crate::core::accounts::{AccountChanges, AccountLogic};
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;
use crate::utils::time::display_timestamp;

fn parse_role(code: &str) -> AppResult<Role> {
    Role::from_code(code).ok_or_else(|| AppError::InvalidRole(code.to_string()))
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Account { action } = &cli.command else {
        return Ok(());
    };

    let pool = open_db(cfg)?;
    let conn = &pool.conn;
    require(conn, cli.token.as_deref(), Some(Role::Admin))?;
    let tz = cfg.tz()?;

    match action {
        AccountCmd::Add {
            name,
            email,
            password,
            role,
        } => {
            let role = parse_role(role)?;
            let id = AccountLogic::add(conn, name, email, password, role, tz)?;
            success(format!("Account #{id} created: {name} ({role})"));
        }

        AccountCmd::Update {
            id,
            name,
            email,
            password,
            role,
        } => {
            let changes = AccountChanges {
                name: name.as_deref(),
                email: email.as_deref(),
                password: password.as_deref(),
                role: role.as_deref().map(parse_role).transpose()?,
            };
            let updated = AccountLogic::update(conn, *id, changes)?;
            success(format!("Account #{} updated: {} <{}> ({})", updated.id, updated.name, updated.email, updated.role));
        }

        AccountCmd::Remove { id } => {
            let removed = AccountLogic::remove(conn, *id)?;
            success(format!("Account #{} removed: {}", removed.id, removed.email));
        }

        AccountCmd::Promote { id } => {
            let account = AccountLogic::set_role(conn, *id, Role::Admin)?;
            success(format!("{} is now {}", account.email, account.role));
        }

        AccountCmd::Demote { id } => {
            let account = AccountLogic::set_role(conn, *id, Role::User)?;
            success(format!("{} is now {}", account.email, account.role));
        }

        AccountCmd::List => {
            let accounts = AccountLogic::list(conn)?;
            if accounts.is_empty() {
                info("No accounts.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "NAME", "EMAIL", "ROLE", "CREATED"]);
            for a in &accounts {
                table.add_row(vec![
                    a.id.to_string(),
                    a.name.clone(),
                    a.email.clone(),
                    a.role.to_string(),
                    display_timestamp(&a.created_at, tz),
                ]);
            }
            println!("{}", table.render());
        }
    }

    Ok(())
}

use crate::cli::commands::{PhotoFile, open_db, require};
use crate::cli::parser::{Cli, Commands, IdentityCmd};
use crate::config::Config;
use crate::core::identities::IdentityLogic;
use crate::errors::AppResult;
use crate::models::role::Role;
use crate::ui::messages::{info, success, warning};
use crate::utils::table::Table;
use crate::utils::time::display_timestamp;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Identity { action } = &cli.command else {
        return Ok(());
    };

    let pool = open_db(cfg)?;
    let conn = &pool.conn;
    require(conn, cli.token.as_deref(), Some(Role::Admin))?;
    let tz = cfg.tz()?;

    match action {
        IdentityCmd::Register { name, email, photo } => {
            let photo = photo
                .as_deref()
                .map(|p| PhotoFile::read(p, None))
                .transpose()?;
            let live = photo.as_ref().map(PhotoFile::as_live);
            let id = IdentityLogic::register(conn, name, email, live.as_ref(), cfg.min_image_bytes, tz)?;
            success(format!("Employee #{id} registered: {name}"));
            if live.is_none() {
                warning("No reference photo: this employee cannot be matched until one is added");
            }
        }

        IdentityCmd::Update {
            id,
            name,
            email,
            photo,
        } => {
            let photo = photo
                .as_deref()
                .map(|p| PhotoFile::read(p, None))
                .transpose()?;
            let live = photo.as_ref().map(PhotoFile::as_live);
            let updated = IdentityLogic::update(
                conn,
                *id,
                name.as_deref(),
                email.as_deref(),
                live.as_ref(),
                cfg.min_image_bytes,
            )?;
            success(format!("Employee #{} updated: {} <{}>", updated.id, updated.name, updated.email));
        }

        IdentityCmd::Remove { ids } => {
            let (removed, missing) = IdentityLogic::remove(conn, ids)?;
            for identity in &removed {
                success(format!("Employee #{} removed: {}", identity.id, identity.name));
            }
            for id in missing {
                warning(format!("Employee #{id} not found"));
            }
        }

        IdentityCmd::List => {
            let identities = IdentityLogic::list(conn)?;
            if identities.is_empty() {
                info("No registered employees.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "NAME", "EMAIL", "PHOTO", "CREATED"]);
            for i in &identities {
                table.add_row(vec![
                    i.id.to_string(),
                    i.name.clone(),
                    i.email.clone(),
                    if i.has_reference() { "yes" } else { "no" }.to_string(),
                    display_timestamp(&i.created_at, tz),
                ]);
            }
            println!("{}", table.render());
        }
    }

    Ok(())
}

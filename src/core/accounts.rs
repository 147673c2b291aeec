use crate::auth::password::hash_password;
use crate::db::accounts;
use crate::db::log::ttlog;
use crate::db::sessions::{delete_sessions_for, refresh_sessions_for};
use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::role::Role;
use crate::utils::email::normalize_email;
use crate::utils::time::civil_timestamp;
use chrono_tz::Tz;
use rusqlite::Connection;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@admin.com";

/// Well-known accounts created when no account of their role exists.
const DEFAULT_ACCOUNTS: &[(&str, &str, &str, Role)] = &[
    ("Administrator", DEFAULT_ADMIN_EMAIL, "admin123", Role::Admin),
    ("Employee", "employee@test.com", "emp123", Role::Employee),
];

/// Changes accepted by `AccountLogic::update`.
#[derive(Debug, Default)]
pub struct AccountChanges<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub role: Option<Role>,
}

pub struct AccountLogic;

impl AccountLogic {
    /// Returns how many default accounts were created.
    pub fn seed_defaults(conn: &Connection, tz: Tz) -> AppResult<usize> {
        let mut created = 0;
        for (name, email, password, role) in DEFAULT_ACCOUNTS {
            if accounts::count_by_role(conn, *role)? > 0
                || accounts::find_by_email(conn, email)?.is_some()
            {
                continue;
            }
            let hash = hash_password(password)?;
            accounts::insert_account(conn, name, email, &hash, *role, &civil_timestamp(tz))?;
            ttlog(conn, "seed", email, &format!("Default {role} account created"))?;
            tracing::info!(email, role = %role, "default account seeded");
            created += 1;
        }
        Ok(created)
    }

    pub fn add(
        conn: &Connection,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        tz: Tz,
    ) -> AppResult<i64> {
        let email = normalize_email(email)?;
        let name = require_name(name)?;
        if password.is_empty() {
            return Err(AppError::Other("password must not be empty".into()));
        }

        let hash = hash_password(password)?;
        let id = accounts::insert_account(conn, name, &email, &hash, role, &civil_timestamp(tz))?;
        ttlog(conn, "account_add", &email, &format!("Account #{id} created as {role}"))?;
        Ok(id)
    }

    /// A role or password change ends every open session of the account;
    /// a new name or email is copied into them.
    pub fn update(conn: &Connection, id: i64, changes: AccountChanges) -> AppResult<Account> {
        let current = Self::get(conn, id)?;

        let email = changes.email.map(normalize_email).transpose()?;
        let name = changes.name.map(require_name).transpose()?;
        let hash = changes.password.map(hash_password).transpose()?;

        accounts::update_account(conn, id, name, email.as_deref(), hash.as_deref(), changes.role)?;

        let updated = Self::get(conn, id)?;

        if changes.role.is_some_and(|r| r != current.role) || hash.is_some() {
            delete_sessions_for(conn, id)?;
        } else if updated.name != current.name || updated.email != current.email {
            refresh_sessions_for(conn, id, &updated.name, &updated.email)?;
        }

        ttlog(conn, "account_update", &updated.email, &format!("Account #{id} updated"))?;
        Ok(updated)
    }

    pub fn set_role(conn: &Connection, id: i64, role: Role) -> AppResult<Account> {
        Self::update(
            conn,
            id,
            AccountChanges {
                role: Some(role),
                ..Default::default()
            },
        )
    }

    /// The well-known admin account cannot be removed.
    pub fn remove(conn: &Connection, id: i64) -> AppResult<Account> {
        let account = Self::get(conn, id)?;
        if account.email == DEFAULT_ADMIN_EMAIL {
            return Err(AppError::Protected("cannot delete default admin".into()));
        }

        delete_sessions_for(conn, id)?;
        accounts::delete_account(conn, id)?;
        ttlog(conn, "account_remove", &account.email, &format!("Account #{id} removed"))?;
        Ok(account)
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<Account>> {
        accounts::load_accounts(conn)
    }

    fn get(conn: &Connection, id: i64) -> AppResult<Account> {
        accounts::find_by_id(conn, id)?.ok_or_else(|| AppError::NotFound(format!("account #{id}")))
    }
}

pub(crate) fn require_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Other("name must not be empty".into()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db::migrate::run_pending_migrations;
    use crate::db::sessions::{count_sessions, find_session, insert_session};
    use crate::models::session::SessionInfo;

    const TZ: Tz = chrono_tz::Asia::Karachi;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        run_pending_migrations(&c).unwrap();
        c
    }

    #[test]
    fn seeding_runs_once_per_missing_role() {
        let c = conn();
        assert_eq!(AccountLogic::seed_defaults(&c, TZ).unwrap(), 2);
        assert_eq!(AccountLogic::seed_defaults(&c, TZ).unwrap(), 0);

        let admin = accounts::find_by_email(&c, DEFAULT_ADMIN_EMAIL).unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("admin123", &admin.password_hash));
        assert!(admin.created_at.ends_with("+05:00"));
    }

    #[test]
    fn existing_admin_suppresses_default_admin() {
        let c = conn();
        AccountLogic::add(&c, "Boss", "boss@example.com", "pw", Role::Admin, TZ).unwrap();
        assert_eq!(AccountLogic::seed_defaults(&c, TZ).unwrap(), 1);
        assert!(accounts::find_by_email(&c, DEFAULT_ADMIN_EMAIL).unwrap().is_none());
    }

    #[test]
    fn add_normalizes_and_rejects_duplicates() {
        let c = conn();
        AccountLogic::add(&c, "Dana", " Dana@Example.com", "pw", Role::User, TZ).unwrap();
        let err = AccountLogic::add(&c, "Dana 2", "dana@example.com", "pw", Role::User, TZ)
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail(_)));
    }

    #[test]
    fn promotion_ends_open_sessions() {
        let c = conn();
        let id = AccountLogic::add(&c, "Eve", "eve@example.com", "pw", Role::User, TZ).unwrap();
        let info = SessionInfo {
            account_id: id,
            email: "eve@example.com".into(),
            name: "Eve".into(),
            role: Role::User,
            login_time: "t".into(),
        };
        insert_session(&c, "tok", &info).unwrap();

        let eve = AccountLogic::set_role(&c, id, Role::Admin).unwrap();
        assert_eq!(eve.role, Role::Admin);
        assert_eq!(count_sessions(&c).unwrap(), 0);
    }

    #[test]
    fn default_admin_is_protected() {
        let c = conn();
        AccountLogic::seed_defaults(&c, TZ).unwrap();
        let admin = accounts::find_by_email(&c, DEFAULT_ADMIN_EMAIL).unwrap().unwrap();

        assert!(matches!(AccountLogic::remove(&c, admin.id), Err(AppError::Protected(_))));
        assert!(matches!(AccountLogic::remove(&c, 999), Err(AppError::NotFound(_))));
    }

    #[test]
    fn email_change_reaches_open_sessions() {
        let c = conn();
        let id = AccountLogic::add(&c, "Fay", "fay@example.com", "pw", Role::User, TZ).unwrap();
        let info = SessionInfo {
            account_id: id,
            email: "fay@example.com".into(),
            name: "Fay".into(),
            role: Role::User,
            login_time: "t".into(),
        };
        insert_session(&c, "tok", &info).unwrap();

        let changes = AccountChanges {
            name: Some("Fay Li"),
            email: Some("Fay.Li@Example.com"),
            ..Default::default()
        };
        AccountLogic::update(&c, id, changes).unwrap();

        let session = find_session(&c, "tok").unwrap().unwrap();
        assert_eq!(session.email, "fay.li@example.com");
        assert_eq!(session.name, "Fay Li");
        assert_eq!(session.role, Role::User);
    }
}

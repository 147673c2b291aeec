use crate::auth::password::verify_password;
use crate::auth::session::SessionStore;
use crate::db::accounts;
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::models::session::SessionInfo;
use crate::utils::email::normalize_email;
use rusqlite::Connection;

/// Validates session tokens and resolves the caller's role.
pub struct AuthGate<'a> {
    store: &'a dyn SessionStore,
}

impl<'a> AuthGate<'a> {
    pub fn new(store: &'a dyn SessionStore) -> Self {
        Self { store }
    }

    /// `Unauthenticated` for a missing or unknown token, `Forbidden` when
    /// `required` is set and the session holds another role.
    pub fn authorize(&self, token: Option<&str>, required: Option<Role>) -> AppResult<SessionInfo> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        let info = self
            .store
            .resolve(token)?
            .ok_or(AppError::Unauthenticated)?;

        if let Some(role) = required
            && info.role != role
        {
            tracing::debug!(required = %role, actual = %info.role, "role check failed");
            return Err(AppError::Forbidden {
                required: role.to_string(),
                actual: info.role.to_string(),
                home: info.role.home(),
            });
        }

        Ok(info)
    }

    /// Check credentials and open a session for the account.
    pub fn login(
        &self,
        conn: &Connection,
        email: &str,
        password: &str,
        login_time: String,
    ) -> AppResult<(String, SessionInfo)> {
        let email = normalize_email(email).map_err(|_| AppError::InvalidCredentials)?;

        let account = accounts::find_by_email(conn, &email)?
            .filter(|a| verify_password(password, &a.password_hash))
            .ok_or(AppError::InvalidCredentials)?;

        let info = SessionInfo {
            account_id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            login_time,
        };
        let token = self.store.create(info.clone())?;
        Ok((token, info))
    }

    pub fn logout(&self, token: &str) -> AppResult<()> {
        self.store.revoke(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::session::MemorySessionStore;
    use crate::db::migrate::run_pending_migrations;

    fn info(role: Role) -> SessionInfo {
        SessionInfo {
            account_id: 7,
            email: "op@example.com".into(),
            name: "Operator".into(),
            role,
            login_time: "t".into(),
        }
    }

    #[test]
    fn missing_or_unknown_token_is_unauthenticated() {
        let store = MemorySessionStore::new();
        let gate = AuthGate::new(&store);
        assert!(matches!(gate.authorize(None, None), Err(AppError::Unauthenticated)));
        assert!(matches!(gate.authorize(Some("  "), None), Err(AppError::Unauthenticated)));
        assert!(matches!(
            gate.authorize(Some("nope"), Some(Role::Admin)),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn wrong_role_is_forbidden_with_home() {
        let store = MemorySessionStore::new();
        let token = store.create(info(Role::Employee)).unwrap();
        let gate = AuthGate::new(&store);

        match gate.authorize(Some(&token), Some(Role::Admin)) {
            Err(AppError::Forbidden { required, actual, home }) => {
                assert_eq!(required, "Admin");
                assert_eq!(actual, "Employee");
                assert_eq!(home, "/attendance");
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }

        let ok = gate.authorize(Some(&token), Some(Role::Employee)).unwrap();
        assert_eq!(ok.account_id, 7);
        assert!(gate.authorize(Some(&token), None).is_ok());
    }

    #[test]
    fn login_then_logout() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        let hash = hash_password("s3cret").unwrap();
        accounts::insert_account(&conn, "Root", "root@example.com", &hash, Role::Admin, "t")
            .unwrap();

        let store = MemorySessionStore::new();
        let gate = AuthGate::new(&store);

        assert!(matches!(
            gate.login(&conn, "root@example.com", "wrong", "t".into()),
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            gate.login(&conn, "ghost@example.com", "s3cret", "t".into()),
            Err(AppError::InvalidCredentials)
        ));

        let (token, info) = gate
            .login(&conn, " ROOT@example.com ", "s3cret", "t".into())
            .unwrap();
        assert_eq!(info.role, Role::Admin);
        assert_eq!(gate.authorize(Some(&token), Some(Role::Admin)).unwrap(), info);

        gate.logout(&token).unwrap();
        assert!(matches!(
            gate.authorize(Some(&token), None),
            Err(AppError::Unauthenticated)
        ));
    }
}

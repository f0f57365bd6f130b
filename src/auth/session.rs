use rusqlite::Connection;

use crate::auth::cookie::CookieSigner;
use crate::auth::secret::SecretKey;
use crate::db::models::User;

pub const SESSION_COOKIE: &str = "user_id";

/// Stateless cookie sessions: the signed user id is the whole session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    signer: CookieSigner,
}

impl AuthSession {
    pub fn new(key: &SecretKey) -> Self {
        Self {
            signer: CookieSigner::new(key),
        }
    }

    /// Resolve the authenticated user from a `Cookie` header.
    ///
    /// Absence is a normal outcome: a missing or tampered cookie, a
    /// non-numeric id, a deleted user and a storage failure all yield `None`.
    pub fn resolve_user(&self, conn: &Connection, cookie_header: Option<&str>) -> Option<User> {
        let token = cookie_value(cookie_header?, SESSION_COOKIE)?;

        let value = match self.signer.verify(token) {
            Ok(value) => value,
            Err(e) => {
                if !token.is_empty() {
                    tracing::debug!("Rejected session cookie: {}", e);
                }
                return None;
            }
        };

        let user_id: i64 = value.parse().ok()?;

        match User::by_id(conn, user_id) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Session lookup for user {} failed: {}", user_id, e);
                None
            }
        }
    }

    /// `Set-Cookie` value that logs `user` in.
    pub fn login(&self, user: &User) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/",
            self.signer.sign(&user.id.to_string())
        )
    }

    /// `Set-Cookie` value that clears the session.
    pub fn logout(&self) -> String {
        format!("{SESSION_COOKIE}=; Path=/")
    }
}

/// Find `name` in a `Cookie` header of the form `a=1; b=2`.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').map(|s| s.trim()).find_map(|cookie| {
        let mut split = cookie.splitn(2, '=');
        let key = split.next()?.trim();
        let val = split.next()?.trim();
        if key == name {
            Some(val)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::state::DbPool;
    use rusqlite::params;

    fn setup() -> (DbPool, AuthSession, User) {
        let pool = db::memory_pool().unwrap();
        db::run_migrations(&pool).unwrap();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO users (name, pwd_hash) VALUES (?1, ?2)",
            params!["alice", "abcde|00"],
        )
        .unwrap();
        let user = User::by_name(&conn, "alice").unwrap().unwrap();
        drop(conn);

        let session = AuthSession::new(&SecretKey::new("session-test").unwrap());
        (pool, session, user)
    }

    fn header_from_set_cookie(set_cookie: &str) -> String {
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "theme=dark; user_id=1|abc ;other=x";
        assert_eq!(cookie_value(header, "user_id"), Some("1|abc"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("user_id=", "user_id"), Some(""));
        assert_eq!(cookie_value("user_id", "user_id"), None);
    }

    #[test]
    fn login_cookie_has_wire_format() {
        let (_pool, session, user) = setup();
        let set_cookie = session.login(&user);
        let expected_token = session.signer.sign(&user.id.to_string());
        assert_eq!(set_cookie, format!("user_id={expected_token}; Path=/"));
    }

    #[test]
    fn logout_cookie_clears_value() {
        let (_pool, session, _user) = setup();
        assert_eq!(session.logout(), "user_id=; Path=/");
    }

    #[test]
    fn login_cookie_resolves_to_user() {
        let (pool, session, user) = setup();
        let conn = pool.get().unwrap();
        let header = header_from_set_cookie(&session.login(&user));
        assert_eq!(session.resolve_user(&conn, Some(&header)), Some(user));
    }

    #[test]
    fn missing_or_cleared_cookie_is_anonymous() {
        let (pool, session, _user) = setup();
        let conn = pool.get().unwrap();
        assert_eq!(session.resolve_user(&conn, None), None);
        assert_eq!(session.resolve_user(&conn, Some("theme=dark")), None);
        let cleared = header_from_set_cookie(&session.logout());
        assert_eq!(session.resolve_user(&conn, Some(&cleared)), None);
    }

    #[test]
    fn tampered_cookie_is_anonymous() {
        let (pool, session, user) = setup();
        let conn = pool.get().unwrap();
        let token = session.signer.sign(&user.id.to_string());
        let (_, sig) = token.split_once('|').unwrap();
        let forged = format!("user_id={}|{sig}", user.id + 1);
        assert_eq!(session.resolve_user(&conn, Some(&forged)), None);
    }

    #[test]
    fn cookie_from_another_key_is_anonymous() {
        let (pool, session, user) = setup();
        let conn = pool.get().unwrap();
        let other = AuthSession::new(&SecretKey::new("rotated").unwrap());
        let header = header_from_set_cookie(&other.login(&user));
        assert_eq!(session.resolve_user(&conn, Some(&header)), None);
    }

    #[test]
    fn non_numeric_or_unknown_id_is_anonymous() {
        let (pool, session, _user) = setup();
        let conn = pool.get().unwrap();

        let not_a_number = format!("user_id={}", session.signer.sign("alice"));
        assert_eq!(session.resolve_user(&conn, Some(&not_a_number)), None);

        let unknown = format!("user_id={}", session.signer.sign("999"));
        assert_eq!(session.resolve_user(&conn, Some(&unknown)), None);
    }
}

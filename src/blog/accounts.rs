use rusqlite::{params, Connection, ErrorCode};
use serde::Deserialize;

use crate::auth::password;
use crate::blog::{BlogError, BlogResult, ValidationError};
use crate::db;
use crate::db::models::User;

pub const SIGNUP_MISSING_FIELDS: &str = "Please, enter username, password and verify password";
pub const SIGNUP_PASSWORD_MISMATCH: &str = "Passwords didn't match";
pub const SIGNUP_USER_EXISTS: &str = "That user already exists. Please, choose another username";
pub const LOGIN_MISSING_FIELDS: &str = "Please, enter both username and password";
pub const LOGIN_INVALID: &str = "Invaid login";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub verify: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl SignupForm {
    fn rejected(&self, message: &'static str) -> BlogError {
        ValidationError::new(message)
            .with("username", &self.username)
            .with("email", &self.email)
            .into()
    }
}

/// Register a new user. The name check and the insert run in one write
/// transaction so two concurrent signups cannot both claim a name.
pub fn signup(conn: &Connection, form: &SignupForm) -> BlogResult<User> {
    if form.username.is_empty() || form.password.is_empty() || form.verify.is_empty() {
        return Err(form.rejected(SIGNUP_MISSING_FIELDS));
    }

    let user = db::immediate(conn, |conn| {
        if User::by_name(conn, &form.username)?.is_some() {
            return Err(form.rejected(SIGNUP_USER_EXISTS));
        }
        if form.password != form.verify {
            return Err(form.rejected(SIGNUP_PASSWORD_MISMATCH));
        }

        let pwd_hash = password::hash_password(&form.username, &form.password, None);
        let email = Some(form.email.clone()).filter(|e| !e.is_empty());

        match conn.execute(
            "INSERT INTO users (name, pwd_hash, email) VALUES (?1, ?2, ?3)",
            params![form.username, pwd_hash, email],
        ) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                return Err(form.rejected(SIGNUP_USER_EXISTS));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(User {
            id: conn.last_insert_rowid(),
            name: form.username.clone(),
            pwd_hash,
            email,
        })
    })?;

    tracing::info!("Registered user {} ({})", user.name, user.id);
    Ok(user)
}

/// Check credentials and return the matching user.
pub fn login(conn: &Connection, form: &LoginForm) -> BlogResult<User> {
    let rejected = |message: &'static str| -> BlogError {
        ValidationError::new(message)
            .with("username", &form.username)
            .into()
    };

    if form.username.is_empty() || form.password.is_empty() {
        return Err(rejected(LOGIN_MISSING_FIELDS));
    }

    match User::by_name(conn, &form.username)? {
        Some(user) if password::verify_password(&user.name, &form.password, &user.pwd_hash) => {
            tracing::info!("User {} logged in", user.id);
            Ok(user)
        }
        _ => {
            tracing::debug!("Failed login for {}", form.username);
            Err(rejected(LOGIN_INVALID))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DbPool;

    fn test_pool() -> DbPool {
        let pool = db::memory_pool().unwrap();
        db::run_migrations(&pool).unwrap();
        pool
    }

    fn signup_form(username: &str, password: &str, verify: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            password: password.into(),
            verify: verify.into(),
            email: String::new(),
        }
    }

    fn validation_message(err: BlogError) -> &'static str {
        match err {
            BlogError::Validation(v) => v.message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn user_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn signup_creates_user_with_salted_hash() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let user = signup(&conn, &signup_form("alice", "pw123", "pw123")).unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.email, None);
        assert!(password::verify_password("alice", "pw123", &user.pwd_hash));

        let stored = User::by_id(&conn, user.id).unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[test]
    fn signup_keeps_optional_email() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let mut form = signup_form("alice", "pw123", "pw123");
        form.email = "alice@example.com".into();

        let user = signup(&conn, &form).unwrap();
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn signup_requires_all_fields() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        for form in [
            signup_form("", "pw", "pw"),
            signup_form("alice", "", "pw"),
            signup_form("alice", "pw", ""),
        ] {
            let err = signup(&conn, &form).unwrap_err();
            assert_eq!(validation_message(err), SIGNUP_MISSING_FIELDS);
        }
        assert_eq!(user_count(&conn), 0);
    }

    #[test]
    fn signup_rejects_mismatched_passwords_and_echoes_values() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let mut form = signup_form("alice", "pw123", "pw124");
        form.email = "a@example.com".into();

        match signup(&conn, &form).unwrap_err() {
            BlogError::Validation(v) => {
                assert_eq!(v.message, SIGNUP_PASSWORD_MISMATCH);
                assert_eq!(v.values["username"], "alice");
                assert_eq!(v.values["email"], "a@example.com");
                assert!(!v.values.contains_key("password"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(user_count(&conn), 0);
    }

    #[test]
    fn signup_rejects_taken_name() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        signup(&conn, &signup_form("alice", "pw123", "pw123")).unwrap();
        let err = signup(&conn, &signup_form("alice", "other", "other")).unwrap_err();
        assert_eq!(validation_message(err), SIGNUP_USER_EXISTS);
        assert_eq!(user_count(&conn), 1);
    }

    #[test]
    fn login_accepts_correct_password() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let created = signup(&conn, &signup_form("alice", "pw123", "pw123")).unwrap();

        let form = LoginForm {
            username: "alice".into(),
            password: "pw123".into(),
        };
        assert_eq!(login(&conn, &form).unwrap(), created);
    }

    #[test]
    fn login_rejects_wrong_password_and_unknown_user() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        signup(&conn, &signup_form("alice", "pw123", "pw123")).unwrap();

        for (username, password) in [("alice", "wrongpw"), ("bob", "pw123")] {
            let form = LoginForm {
                username: username.into(),
                password: password.into(),
            };
            let err = login(&conn, &form).unwrap_err();
            assert_eq!(validation_message(err), LOGIN_INVALID);
        }
    }

    #[test]
    fn login_requires_both_fields() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let form = LoginForm {
            username: "alice".into(),
            password: String::new(),
        };
        let err = login(&conn, &form).unwrap_err();
        assert_eq!(validation_message(err), LOGIN_MISSING_FIELDS);
    }
}

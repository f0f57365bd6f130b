use rand::Rng;
use sha2::{Digest, Sha256};

use crate::auth::constant_time_eq;

pub const SALT_LEN: usize = 5;
pub const SEPARATOR: char = '|';

const SALT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a random salt of `SALT_LEN` ASCII letters.
pub fn make_salt() -> String {
    let mut rng = rand::thread_rng();
    (0..SALT_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SALT_CHARSET.len());
            SALT_CHARSET[idx] as char
        })
        .collect()
}

/// Hash a password bound to its user name. Returns `salt|hex(sha256(name + password + salt))`.
///
/// A missing or empty salt is replaced by a fresh one.
pub fn hash_password(name: &str, password: &str, salt: Option<&str>) -> String {
    let salt = match salt {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => make_salt(),
    };
    let digest = digest(name, password, &salt);
    format!("{salt}{SEPARATOR}{digest}")
}

/// Check `password` for `name` against a stored `salt|digest` string.
pub fn verify_password(name: &str, password: &str, stored: &str) -> bool {
    let Some((salt, _)) = stored.split_once(SEPARATOR) else {
        return false;
    };
    if salt.is_empty() {
        return false;
    }

    let expected = format!("{salt}{SEPARATOR}{}", digest(name, password, salt));
    constant_time_eq(expected.as_bytes(), stored.as_bytes())
}

fn digest(name: &str, password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_is_five_letters() {
        for _ in 0..100 {
            let salt = make_salt();
            assert_eq!(salt.len(), SALT_LEN);
            assert!(salt.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn hash_has_salt_and_hex_digest() {
        let hash = hash_password("alice", "pw123", None);
        let (salt, digest) = hash.split_once('|').unwrap();
        assert_eq!(salt.len(), SALT_LEN);
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_matches_known_vector() {
        // sha256("alicepw123abcde")
        let expected_digest = {
            let mut hasher = Sha256::new();
            hasher.update(b"alicepw123abcde");
            hex::encode(hasher.finalize())
        };
        assert_eq!(
            hash_password("alice", "pw123", Some("abcde")),
            format!("abcde|{expected_digest}")
        );
    }

    #[test]
    fn explicit_salt_is_deterministic() {
        let a = hash_password("alice", "pw123", Some("QwErT"));
        let b = hash_password("alice", "pw123", Some("QwErT"));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_salt_is_replaced() {
        let hash = hash_password("alice", "pw123", Some(""));
        let (salt, _) = hash.split_once('|').unwrap();
        assert_eq!(salt.len(), SALT_LEN);
    }

    #[test]
    fn verify_accepts_correct_password() {
        let cases = [
            ("alice", "pw123"),
            ("bob", ""),
            ("carol", "correct horse battery staple"),
            ("dave", "pässwörd"),
            ("e|ve", "pipe|in|password"),
        ];
        for (name, password) in cases {
            let stored = hash_password(name, password, None);
            assert!(verify_password(name, password, &stored), "{name}/{password}");
        }
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let cases = [
            ("alice", "pw123", "pw124"),
            ("alice", "pw123", "PW123"),
            ("alice", "pw123", ""),
            ("bob", "", "x"),
        ];
        for (name, password, wrong) in cases {
            let stored = hash_password(name, password, None);
            assert!(!verify_password(name, wrong, &stored), "{name}/{wrong}");
        }
    }

    #[test]
    fn hash_is_bound_to_user_name() {
        let stored = hash_password("alice", "pw123", Some("abcde"));
        assert!(!verify_password("bob", "pw123", &stored));
        assert_ne!(stored, hash_password("bob", "pw123", Some("abcde")));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("alice", "pw123", ""));
        assert!(!verify_password("alice", "pw123", "no-separator"));
        let stored = hash_password("alice", "pw123", Some("abcde"));
        let (_, digest) = stored.split_once('|').unwrap();
        assert!(!verify_password("alice", "pw123", &format!("|{digest}")));
    }
}

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

use crate::auth::constant_time_eq;
use crate::auth::secret::SecretKey;

type HmacSha256 = Hmac<Sha256>;

pub const SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Token has no '|' separator")]
    MissingSeparator,
    #[error("Token carries an empty value")]
    EmptyValue,
    #[error("Token signature does not match")]
    Mismatch,
}

/// Signs values as `value|hex(hmac_sha256(key, value))` and checks them.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl CookieSigner {
    pub fn new(key: &SecretKey) -> Self {
        let mac = HmacSha256::new_from_slice(key.as_bytes())
            .expect("HMAC accepts keys of any length");
        Self { mac }
    }

    pub fn sign(&self, value: &str) -> String {
        format!("{value}{SEPARATOR}{}", self.signature(value))
    }

    /// Returns the signed value if `token` is exactly what `sign` would
    /// produce for it.
    ///
    /// The value is everything before the first separator. The whole token is
    /// recomputed and compared, so a value that itself contains the separator
    /// can never verify.
    pub fn verify(&self, token: &str) -> Result<String, SignatureError> {
        let (value, _) = token
            .split_once(SEPARATOR)
            .ok_or(SignatureError::MissingSeparator)?;
        if value.is_empty() {
            return Err(SignatureError::EmptyValue);
        }

        let expected = self.sign(value);
        if constant_time_eq(expected.as_bytes(), token.as_bytes()) {
            Ok(value.to_string())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    fn signature(&self, value: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSigner")
            .field("key", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> CookieSigner {
        CookieSigner::new(&SecretKey::new("test-key").unwrap())
    }

    #[test]
    fn sign_produces_value_and_hex_signature() {
        let token = signer().sign("42");
        let (value, sig) = token.split_once('|').unwrap();
        assert_eq!(value, "42");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sign_matches_rfc4231_vector() {
        // RFC 4231 test case 2
        let signer = CookieSigner::new(&SecretKey::new("Jefe").unwrap());
        assert_eq!(
            signer.sign("what do ya want for nothing?"),
            "what do ya want for nothing?|\
             5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn verify_round_trips() {
        let signer = signer();
        for value in ["1", "42", "9223372036854775807", "hello world", "ünïcödé"] {
            assert_eq!(signer.verify(&signer.sign(value)).unwrap(), value);
        }
    }

    #[test]
    fn any_single_char_change_in_signature_is_rejected() {
        let signer = signer();
        let token = signer.sign("7");
        let sig_start = token.find('|').unwrap() + 1;

        for i in sig_start..token.len() {
            let original = token.as_bytes()[i];
            for replacement in b"0123456789abcdefABCDEF|x".iter().copied() {
                if replacement == original {
                    continue;
                }
                let mut bytes = token.clone().into_bytes();
                bytes[i] = replacement;
                let tampered = String::from_utf8(bytes).unwrap();
                assert!(signer.verify(&tampered).is_err(), "accepted {tampered}");
            }
        }
    }

    #[test]
    fn tampered_value_is_rejected() {
        let signer = signer();
        let token = signer.sign("7");
        let (_, sig) = token.split_once('|').unwrap();
        assert_eq!(
            signer.verify(&format!("8|{sig}")),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn value_containing_separator_never_verifies() {
        let signer = signer();
        let token = signer.sign("1|2");
        assert_eq!(signer.verify(&token), Err(SignatureError::Mismatch));
    }

    #[test]
    fn malformed_tokens_fail_closed() {
        let signer = signer();
        assert_eq!(signer.verify(""), Err(SignatureError::MissingSeparator));
        assert_eq!(signer.verify("42"), Err(SignatureError::MissingSeparator));
        assert_eq!(signer.verify("|abc"), Err(SignatureError::EmptyValue));
        assert_eq!(signer.verify("42|"), Err(SignatureError::Mismatch));
        assert_eq!(signer.verify("42|||"), Err(SignatureError::Mismatch));
    }

    #[test]
    fn different_keys_do_not_verify_each_other() {
        let a = CookieSigner::new(&SecretKey::new("key-a").unwrap());
        let b = CookieSigner::new(&SecretKey::new("key-b").unwrap());
        assert_eq!(b.verify(&a.sign("42")), Err(SignatureError::Mismatch));
    }
}

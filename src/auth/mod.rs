pub mod cookie;
pub mod guard;
pub mod password;
pub mod secret;
pub mod session;

pub use cookie::{CookieSigner, SignatureError};
pub use guard::{Action, Denial, Denied};
pub use secret::SecretKey;
pub use session::AuthSession;

/// Compare two byte strings without short-circuiting on the first difference.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    // If lengths differ, still compare to avoid timing leak
    let len_match = a.len() == b.len();
    let max_len = a.len().max(b.len());

    let mut result = 0u8;
    for i in 0..max_len {
        let byte_a = a.get(i).copied().unwrap_or(0);
        let byte_b = b.get(i).copied().unwrap_or(0);
        result |= byte_a ^ byte_b;
    }

    len_match && result == 0
}

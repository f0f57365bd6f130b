use rand::Rng;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const SECRET_KEY_FILE: &str = "secret_key";
const GENERATED_KEY_LEN: usize = 32;

/// Process-wide key for signing session cookies. Read-only after startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Arc<[u8]>);

impl SecretKey {
    /// Returns `None` for an empty key.
    pub fn new(bytes: impl AsRef<[u8]>) -> Option<Self> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return None;
        }
        Some(Self(Arc::from(bytes)))
    }

    pub fn generate() -> Self {
        let bytes: [u8; GENERATED_KEY_LEN] = rand::thread_rng().gen();
        Self(Arc::from(&bytes[..]))
    }

    /// Load the key persisted in `data_dir`, or generate and persist one.
    pub fn load_or_create(data_dir: &Path) -> anyhow::Result<Self> {
        let path = data_dir.join(SECRET_KEY_FILE);

        if path.exists() {
            let encoded = fs::read_to_string(&path)?;
            let bytes = hex::decode(encoded.trim())?;
            Self::new(bytes)
                .ok_or_else(|| anyhow::anyhow!("Secret key file {} is empty", path.display()))
        } else {
            let key = Self::generate();
            fs::write(&path, hex::encode(key.as_bytes()))?;
            tracing::info!("Generated new cookie signing key at {}", path.display());
            Ok(key)
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"[redacted]").finish()
    }
}

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::models::DeviceId;

pub const DEVICE_ID_KEY: &str = "device_id";

#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("Local storage unavailable: {0}")]
    Unavailable(String),
}

/// Client-local persistent key/value storage (browser storage, a cookie
/// jar, a file). Never network backed.
pub trait TokenStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: TokenStorage + ?Sized> TokenStorage for &T {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).store(key, value)
    }
}

/// Source of the anonymous identifier for the current client.
pub trait DeviceIdentityStore {
    fn get(&self) -> DeviceId;
}

/// Hashes the environment attributes together with a nanosecond timestamp.
/// Identical environments still diverge through the timestamp.
pub fn fingerprint_device(environment: &[&str], now: OffsetDateTime) -> DeviceId {
    let mut hasher = Sha256::new();
    hasher.update(environment.join("|").as_bytes());
    hasher.update(now.unix_timestamp_nanos().to_be_bytes());
    DeviceId::new(format!("device_{}", URL_SAFE_NO_PAD.encode(hasher.finalize())))
}

/// Get-or-create device identity over a [`TokenStorage`]. When the storage
/// fails, a session-only identifier is generated once and reused.
pub struct LocalDeviceIdentity<S> {
    storage: S,
    environment: Vec<String>,
    session: OnceLock<DeviceId>,
}

impl<S: TokenStorage> LocalDeviceIdentity<S> {
    pub fn new(storage: S, environment: Vec<String>) -> Self {
        Self { storage, environment, session: OnceLock::new() }
    }

    fn generate(&self) -> DeviceId {
        let parts: Vec<&str> = self.environment.iter().map(String::as_str).collect();
        fingerprint_device(&parts, OffsetDateTime::now_utc())
    }

    fn session_identity(&self) -> DeviceId {
        self.session.get_or_init(|| self.generate()).clone()
    }
}

impl<S: TokenStorage> DeviceIdentityStore for LocalDeviceIdentity<S> {
    fn get(&self) -> DeviceId {
        match self.storage.load(DEVICE_ID_KEY) {
            Ok(Some(existing)) if !existing.is_empty() => return DeviceId::new(existing),
            Ok(_) => {}
            Err(e) => {
                warn!("Falling back to session device id: {}", e);
                return self.session_identity();
            }
        }

        let generated = self.generate();
        if let Err(e) = self.storage.store(DEVICE_ID_KEY, generated.as_str()) {
            warn!("Could not persist device id, using session id: {}", e);
            return self.session_identity();
        }
        debug!("Generated new device id");
        generated
    }
}

#[derive(Debug, Clone)]
pub struct FixedDeviceIdentity(pub DeviceId);

impl FixedDeviceIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(DeviceId::new(value))
    }
}

impl DeviceIdentityStore for FixedDeviceIdentity {
    fn get(&self) -> DeviceId {
        self.0.clone()
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<HashMap<String, String>>,
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let tokens = self.tokens.lock().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(tokens.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut tokens = self.tokens.lock().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        tokens.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

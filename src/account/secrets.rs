//! Secret storage for account credentials.
//!
//! Secrets never touch the metadata records on disk; they live in the
//! platform secret store behind the [`SecretStore`] trait. The default
//! implementation uses the `keyring` crate; [`MemorySecretStore`] exists for
//! tests and for embedders that manage secrets themselves.

use crate::error::AccountError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Service identifier under which account secrets are stored
pub const SECRET_SERVICE: &str = "com.butlercore.accounts";

/// Storage for account secrets, keyed by username
pub trait SecretStore: Send + Sync {
    /// Look up the secret for a username; `None` when no entry exists.
    fn get(&self, username: &str) -> Result<Option<String>, AccountError>;

    /// Store or replace the secret for a username.
    fn set(&self, username: &str, secret: &str) -> Result<(), AccountError>;

    /// Remove the secret for a username. Idempotent: a missing entry is not
    /// an error.
    fn delete(&self, username: &str) -> Result<(), AccountError>;
}

/// Secret store backed by the platform keychain via the `keyring` crate
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    /// A store under the given service identifier.
    pub fn new(service: impl Into<String>) -> Self {
        KeyringSecretStore {
            service: service.into(),
        }
    }

    fn entry(&self, username: &str) -> Result<keyring::Entry, AccountError> {
        keyring::Entry::new(&self.service, username)
            .map_err(|e| AccountError::SecretStore(e.to_string()))
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        KeyringSecretStore::new(SECRET_SERVICE)
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, username: &str) -> Result<Option<String>, AccountError> {
        match self.entry(username)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AccountError::SecretStore(e.to_string())),
        }
    }

    fn set(&self, username: &str, secret: &str) -> Result<(), AccountError> {
        self.entry(username)?
            .set_password(secret)
            .map_err(|e| AccountError::SecretStore(e.to_string()))
    }

    fn delete(&self, username: &str) -> Result<(), AccountError> {
        match self.entry(username)?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AccountError::SecretStore(e.to_string())),
        }
    }
}

/// In-memory secret store
///
/// Useful in tests and in hosts that keep secrets elsewhere.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    /// An empty store.
    pub fn new() -> Self {
        MemorySecretStore::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, username: &str) -> Result<Option<String>, AccountError> {
        Ok(self
            .secrets
            .lock()
            .map_err(|_| AccountError::SecretStore("poisoned lock".to_string()))?
            .get(username)
            .cloned())
    }

    fn set(&self, username: &str, secret: &str) -> Result<(), AccountError> {
        self.secrets
            .lock()
            .map_err(|_| AccountError::SecretStore("poisoned lock".to_string()))?
            .insert(username.to_string(), secret.to_string());
        Ok(())
    }

    fn delete(&self, username: &str) -> Result<(), AccountError> {
        self.secrets
            .lock()
            .map_err(|_| AccountError::SecretStore("poisoned lock".to_string()))?
            .remove(username);
        Ok(())
    }
}

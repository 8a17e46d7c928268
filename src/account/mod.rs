//! Account credentials and their persistence.
//!
//! An [`Account`] describes one server a user has added: where it lives, how
//! to authenticate against it, and whether TLS server-identity verification
//! is overridden for it. The [`AccountStore`] owns the authoritative
//! in-memory account list and persists it with a strict split:
//!
//! - **Metadata** goes into a versioned JSON record per account, keyed by a
//!   percent-encoded form of the base URL, written to a private directory and
//!   mirrored best-effort into a directory shared with a secondary execution
//!   context (such as an app extension).
//! - **The secret** never appears in any record; it lives in the platform
//!   secret store keyed by username (see [`SecretStore`]) and is re-attached
//!   to the in-memory account at load time. A metadata-only restore yields an
//!   account with no secret rather than failing.
//!
//! The store is a plain constructed value; hosts create one at startup and
//! pass it where needed.

mod favorites;
mod secrets;

#[cfg(test)]
mod tests;

pub use favorites::FavoritesStore;
pub use secrets::{KeyringSecretStore, MemorySecretStore, SecretStore, SECRET_SERVICE};

use crate::error::AccountError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const RECORD_VERSION: u32 = 1;

/// Longest storage key the backing filesystems are guaranteed to accept
const MAX_KEY_LENGTH: usize = 255;

/// One server a user has added, with its credentials
///
/// Accounts are value types: two accounts are equal iff base URL, username,
/// secret, port and trust flag are all equal. The display name is cosmetic
/// and excluded from equality.
#[derive(Clone, Debug)]
pub struct Account {
    /// Base URL of the server
    pub base_url: Url,
    /// Username for HTTP Basic authentication
    pub username: Option<String>,
    /// Password or API token; stored only in the secret store
    pub password: Option<String>,
    /// Port override applied to every request against this account
    pub port: Option<u16>,
    /// Cosmetic name shown in place of the URL
    pub display_name: Option<String>,
    /// Accept any server certificate for this account's requests
    pub trust_all_certificates: bool,
}

impl Account {
    /// An account with the given base URL and no credentials.
    pub fn new(base_url: Url) -> Self {
        Account {
            base_url,
            username: None,
            password: None,
            port: None,
            display_name: None,
            trust_all_certificates: false,
        }
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url
            && self.username == other.username
            && self.password == other.password
            && self.port == other.port
            && self.trust_all_certificates == other.trust_all_certificates
    }
}

impl Eq for Account {}

/// The on-disk shape of an account: everything except the secret
#[derive(Serialize, Deserialize)]
struct AccountRecord {
    version: u32,
    base_url: Url,
    port: Option<u16>,
    username: Option<String>,
    display_name: Option<String>,
    trust_all_certificates: bool,
}

impl AccountRecord {
    fn from_account(account: &Account) -> Self {
        AccountRecord {
            version: RECORD_VERSION,
            base_url: account.base_url.clone(),
            port: account.port,
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            trust_all_certificates: account.trust_all_certificates,
        }
    }

    fn into_account(self) -> Account {
        Account {
            base_url: self.base_url,
            username: self.username,
            password: None,
            port: self.port,
            display_name: self.display_name,
            trust_all_certificates: self.trust_all_certificates,
        }
    }
}

/// Persists accounts and owns the authoritative in-memory account list
pub struct AccountStore {
    directory: PathBuf,
    shared_directory: Option<PathBuf>,
    secrets: Arc<dyn SecretStore>,
    favorites: FavoritesStore,
    accounts: Vec<Account>,
}

impl AccountStore {
    /// Open a store over the given directories, loading all persisted
    /// accounts once.
    ///
    /// `shared_directory` is mirrored on writes so a secondary execution
    /// context can read account metadata; mirroring failures are logged, not
    /// fatal.
    pub fn open(
        directory: PathBuf,
        shared_directory: Option<PathBuf>,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        let favorites = FavoritesStore::open(directory.clone(), shared_directory.clone());
        let mut store = AccountStore {
            directory,
            shared_directory,
            secrets,
            favorites,
            accounts: Vec::new(),
        };
        store.refresh();
        store
    }

    /// The current accounts, as loaded at startup or at the last refresh.
    pub fn list(&self) -> &[Account] {
        &self.accounts
    }

    /// Reload the in-memory list from storage.
    pub fn refresh(&mut self) {
        self.accounts = self.load_accounts();
    }

    /// The favorites persisted alongside the accounts.
    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Mutable access to the favorites store.
    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    /// Add an account, persisting its metadata and secret.
    ///
    /// Fails with [`AccountError::AlreadyExists`] when an equal account is
    /// already present.
    pub fn add(&mut self, account: Account) -> Result<(), AccountError> {
        if self.accounts.contains(&account) {
            return Err(AccountError::AlreadyExists);
        }
        self.persist(&account)?;
        self.accounts.push(account);
        Ok(())
    }

    /// Replace `old` with `new`, carrying favorites over.
    ///
    /// This is a non-atomic two-step operation: favorites are reassigned and
    /// `old` is deleted before `new` is added. If the add fails, the store is
    /// left without either account; callers that need the old state back must
    /// re-add it themselves.
    pub fn edit(&mut self, new: Account, old: &Account) -> Result<(), AccountError> {
        self.favorites.reassign(&old.base_url, &new.base_url)?;
        // The favorites already point at the new account; a cascading delete
        // would wipe them whenever both accounts share a base URL.
        self.delete_inner(old, false)?;
        self.add(new)
    }

    /// Delete an account: metadata from both storage locations, its secret,
    /// and every favorite referencing it.
    pub fn delete(&mut self, account: &Account) -> Result<(), AccountError> {
        self.delete_inner(account, true)
    }

    fn delete_inner(
        &mut self,
        account: &Account,
        cascade_favorites: bool,
    ) -> Result<(), AccountError> {
        let key = storage_key(&account.base_url)?;

        fs::remove_file(self.directory.join(&key))?;

        if let Some(shared) = &self.shared_directory {
            match fs::remove_file(shared.join(&key)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        if cascade_favorites {
            self.favorites.remove_account(&account.base_url)?;
        }

        if let Some(username) = &account.username {
            self.secrets.delete(username)?;
        }

        self.refresh();
        Ok(())
    }

    /// Persist every in-memory account; used after bulk mutation.
    pub fn save(&self) -> Result<(), AccountError> {
        for account in &self.accounts {
            self.persist(account)?;
        }
        Ok(())
    }

    fn persist(&self, account: &Account) -> Result<(), AccountError> {
        // The secret goes to the secret store only, never into the record.
        if let (Some(username), Some(password)) = (&account.username, &account.password) {
            if let Err(e) = self.secrets.set(username, password) {
                warn!(username, error = %e, "could not store account secret");
            }
        }

        let key = storage_key(&account.base_url)?;
        let record = serde_json::to_vec_pretty(&AccountRecord::from_account(account))?;

        fs::create_dir_all(&self.directory)?;
        fs::write(self.directory.join(&key), &record)?;

        // The shared copy is best-effort.
        if let Some(shared) = &self.shared_directory {
            if let Err(e) =
                fs::create_dir_all(shared).and_then(|_| fs::write(shared.join(&key), &record))
            {
                warn!(error = %e, "could not mirror account record to shared storage");
            }
        }
        Ok(())
    }

    fn load_accounts(&self) -> Vec<Account> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut accounts = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.file_name().and_then(|n| n.to_str()) == Some("favorites.json") {
                continue;
            }
            match load_record(&path) {
                Some(record) => {
                    let mut account = record.into_account();
                    // Re-attach the secret; a secret-store miss leaves it unset.
                    if let Some(username) = &account.username {
                        account.password = self.secrets.get(username).ok().flatten();
                    }
                    accounts.push(account);
                }
                None => debug!(path = %path.display(), "skipping unreadable account record"),
            }
        }
        accounts
    }
}

fn load_record(path: &Path) -> Option<AccountRecord> {
    let bytes = fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The storage key for an account: its base URL percent-encoded down to a
/// filesystem-safe name.
fn storage_key(base_url: &Url) -> Result<String, AccountError> {
    let key = urlencoding::encode(base_url.as_str()).into_owned();
    if key.is_empty() || key.len() > MAX_KEY_LENGTH {
        return Err(AccountError::UrlEncoding);
    }
    Ok(key)
}

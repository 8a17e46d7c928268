//! Persistence for user-pinned favorites.

use crate::account::Account;
use crate::error::AccountError;
use crate::model::{Favoritable, Favorite};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use url::Url;

const FAVORITES_FILE: &str = "favorites.json";
const RECORD_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct FavoritesRecord {
    version: u32,
    favorites: Vec<Favorite>,
}

/// Stores favorites alongside the account records, mirrored to the shared
/// directory on a best-effort basis.
pub struct FavoritesStore {
    directory: PathBuf,
    shared_directory: Option<PathBuf>,
    favorites: Vec<Favorite>,
}

impl FavoritesStore {
    /// Open the store, loading any persisted favorites.
    pub fn open(directory: PathBuf, shared_directory: Option<PathBuf>) -> Self {
        let favorites = load_record(&directory.join(FAVORITES_FILE));
        FavoritesStore {
            directory,
            shared_directory,
            favorites,
        }
    }

    /// All favorites, in insertion order.
    pub fn list(&self) -> &[Favorite] {
        &self.favorites
    }

    /// Whether a target is pinned, regardless of account.
    pub fn is_favorite(&self, target: &Favoritable) -> bool {
        self.favorites
            .iter()
            .any(|favorite| favorite.target.key() == target.key())
    }

    /// Pin the target if it is not pinned, unpin it otherwise.
    pub fn toggle(&mut self, target: Favoritable, account: &Account) -> Result<(), AccountError> {
        let key = target.key();
        if let Some(index) = self
            .favorites
            .iter()
            .position(|favorite| favorite.target.key() == key)
        {
            self.favorites.remove(index);
        } else {
            self.favorites
                .push(Favorite::new(target, account.base_url.clone()));
        }
        self.save()
    }

    /// Move every favorite of one account over to another.
    pub fn reassign(&mut self, from: &Url, to: &Url) -> Result<(), AccountError> {
        let mut changed = false;
        for favorite in &mut self.favorites {
            if favorite.account_url == *from {
                favorite.account_url = to.clone();
                changed = true;
            }
        }
        if !changed {
            return Ok(());
        }
        self.save()
    }

    /// Drop every favorite referencing the given account.
    pub fn remove_account(&mut self, account_url: &Url) -> Result<(), AccountError> {
        let before = self.favorites.len();
        self.favorites
            .retain(|favorite| favorite.account_url != *account_url);
        if self.favorites.len() == before {
            return Ok(());
        }
        self.save()
    }

    fn save(&self) -> Result<(), AccountError> {
        let record = FavoritesRecord {
            version: RECORD_VERSION,
            favorites: self.favorites.clone(),
        };
        let serialized = serde_json::to_vec_pretty(&record)?;

        fs::create_dir_all(&self.directory)?;
        fs::write(self.directory.join(FAVORITES_FILE), &serialized)?;

        // The shared copy is best-effort.
        if let Some(shared) = &self.shared_directory {
            if let Err(e) = fs::create_dir_all(shared)
                .and_then(|_| fs::write(shared.join(FAVORITES_FILE), &serialized))
            {
                warn!(error = %e, "could not mirror favorites to shared storage");
            }
        }
        Ok(())
    }
}

fn load_record(path: &Path) -> Vec<Favorite> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_slice::<FavoritesRecord>(&bytes) {
        Ok(record) => record.favorites,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "discarding unreadable favorites record");
            Vec::new()
        }
    }
}

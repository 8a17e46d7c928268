use super::*;
use crate::model::Favoritable;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

fn account(base: &str, username: Option<&str>, password: Option<&str>) -> Account {
    Account {
        base_url: Url::parse(base).unwrap(),
        username: username.map(str::to_string),
        password: password.map(str::to_string),
        port: None,
        display_name: None,
        trust_all_certificates: false,
    }
}

fn open_store(dir: &TempDir, shared: Option<&TempDir>, secrets: Arc<MemorySecretStore>) -> AccountStore {
    AccountStore::open(
        dir.path().to_path_buf(),
        shared.map(|s| s.path().to_path_buf()),
        secrets,
    )
}

#[test]
fn equality_covers_credentials_but_not_display_name() {
    let a = account("https://jenkins.example.com/", Some("jane"), Some("s3cret"));
    let mut b = a.clone();
    b.display_name = Some("Work".to_string());
    assert_eq!(a, b);

    let mut c = a.clone();
    c.password = Some("other".to_string());
    assert_ne!(a, c);

    let mut d = a.clone();
    d.port = Some(8443);
    assert_ne!(a, d);

    let mut e = a.clone();
    e.trust_all_certificates = true;
    assert_ne!(a, e);
}

#[test]
fn duplicate_add_fails_and_leaves_count_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, Arc::new(MemorySecretStore::new()));

    let a = account("https://jenkins.example.com/", Some("jane"), Some("pw"));
    store.add(a.clone()).unwrap();
    assert_eq!(store.list().len(), 1);

    match store.add(a) {
        Err(AccountError::AlreadyExists) => {}
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
    assert_eq!(store.list().len(), 1);
}

#[test]
fn secret_never_reaches_the_metadata_record() {
    let dir = TempDir::new().unwrap();
    let secrets = Arc::new(MemorySecretStore::new());
    let mut store = open_store(&dir, None, secrets);

    let a = account("https://jenkins.example.com/", Some("jane"), Some("s3cret"));
    store.add(a).unwrap();

    for entry in std::fs::read_dir(dir.path()).unwrap().flatten() {
        let contents = std::fs::read_to_string(entry.path()).unwrap();
        assert!(
            !contents.contains("s3cret"),
            "secret leaked into {}",
            entry.path().display()
        );
    }
}

#[test]
fn metadata_only_restore_yields_account_without_secret() {
    let dir = TempDir::new().unwrap();
    let secrets = Arc::new(MemorySecretStore::new());
    let mut store = open_store(&dir, None, secrets);
    store
        .add(account("https://jenkins.example.com/", Some("jane"), Some("s3cret")))
        .unwrap();
    drop(store);

    // A fresh secret store simulates a secret-store miss.
    let dir_path = dir.path().to_path_buf();
    let store = AccountStore::open(dir_path, None, Arc::new(MemorySecretStore::new()));
    assert_eq!(store.list().len(), 1);
    assert_eq!(store.list()[0].username.as_deref(), Some("jane"));
    assert_eq!(store.list()[0].password, None);
}

#[test]
fn reload_reattaches_secret_from_the_store() {
    let dir = TempDir::new().unwrap();
    let secrets = Arc::new(MemorySecretStore::new());
    let mut store = open_store(&dir, None, secrets.clone());
    store
        .add(account("https://jenkins.example.com/", Some("jane"), Some("s3cret")))
        .unwrap();
    drop(store);

    let store = AccountStore::open(dir.path().to_path_buf(), None, secrets);
    assert_eq!(store.list()[0].password.as_deref(), Some("s3cret"));
}

#[test]
fn delete_cascades_to_secret_and_favorites() {
    let dir = TempDir::new().unwrap();
    let secrets = Arc::new(MemorySecretStore::new());
    let mut store = open_store(&dir, None, secrets.clone());

    let a = account("https://jenkins.example.com/", Some("jane"), Some("pw"));
    store.add(a.clone()).unwrap();
    store
        .favorites_mut()
        .toggle(
            Favoritable::Job {
                url: Url::parse("https://jenkins.example.com/job/api/").unwrap(),
            },
            &a,
        )
        .unwrap();
    assert_eq!(store.favorites().list().len(), 1);

    store.delete(&a).unwrap();

    assert!(store.list().is_empty());
    assert_eq!(secrets.get("jane").unwrap(), None);
    assert!(store.favorites().list().is_empty());
}

#[test]
fn delete_removes_both_storage_locations() {
    let dir = TempDir::new().unwrap();
    let shared = TempDir::new().unwrap();
    let mut store = open_store(&dir, Some(&shared), Arc::new(MemorySecretStore::new()));

    let a = account("https://jenkins.example.com/", None, None);
    store.add(a.clone()).unwrap();

    let private_records = std::fs::read_dir(dir.path()).unwrap().count();
    let shared_records = std::fs::read_dir(shared.path()).unwrap().count();
    assert_eq!(private_records, 1);
    assert_eq!(shared_records, 1);

    store.delete(&a).unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(std::fs::read_dir(shared.path()).unwrap().count(), 0);
}

#[test]
fn edit_reassigns_favorites_to_the_new_account() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, Arc::new(MemorySecretStore::new()));

    let old = account("https://old.example.com/", Some("jane"), Some("pw"));
    store.add(old.clone()).unwrap();
    store
        .favorites_mut()
        .toggle(
            Favoritable::Job {
                url: Url::parse("https://old.example.com/job/api/").unwrap(),
            },
            &old,
        )
        .unwrap();

    let new = account("https://new.example.com/", Some("jane"), Some("pw"));
    store.edit(new.clone(), &old).unwrap();

    assert_eq!(store.list(), &[new.clone()]);
    assert_eq!(
        store.favorites().list()[0].account_url,
        new.base_url
    );
}

#[test]
fn credentials_edit_keeps_favorites() {
    let dir = TempDir::new().unwrap();
    let secrets = Arc::new(MemorySecretStore::new());
    let mut store = open_store(&dir, None, secrets.clone());

    let old = account("https://jenkins.example.com/", Some("jane"), Some("pw"));
    store.add(old.clone()).unwrap();
    store
        .favorites_mut()
        .toggle(
            Favoritable::Job {
                url: Url::parse("https://jenkins.example.com/job/api/").unwrap(),
            },
            &old,
        )
        .unwrap();

    // Same base URL, only the secret changes.
    let mut new = old.clone();
    new.password = Some("rotated".to_string());
    store.edit(new.clone(), &old).unwrap();

    assert_eq!(store.list(), &[new.clone()]);
    assert_eq!(store.favorites().list().len(), 1);
    assert_eq!(store.favorites().list()[0].account_url, new.base_url);
    assert_eq!(secrets.get("jane").unwrap().as_deref(), Some("rotated"));
}

#[test]
fn oversized_storage_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, Arc::new(MemorySecretStore::new()));

    let long_path = "a/".repeat(400);
    let a = account(
        &format!("https://jenkins.example.com/{long_path}"),
        None,
        None,
    );
    match store.add(a) {
        Err(AccountError::UrlEncoding) => {}
        other => panic!("expected UrlEncoding, got {other:?}"),
    }
    assert!(store.list().is_empty());
}

#[test]
fn refresh_picks_up_external_changes() {
    let dir = TempDir::new().unwrap();
    let secrets = Arc::new(MemorySecretStore::new());
    let mut store = open_store(&dir, None, secrets.clone());
    store
        .add(account("https://jenkins.example.com/", None, None))
        .unwrap();

    // A second store writes another record into the same directory.
    let mut other = AccountStore::open(dir.path().to_path_buf(), None, secrets);
    other
        .add(account("https://ci.example.com/", None, None))
        .unwrap();

    assert_eq!(store.list().len(), 1);
    store.refresh();
    assert_eq!(store.list().len(), 2);
}

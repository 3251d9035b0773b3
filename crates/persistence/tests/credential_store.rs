use boxtrack_core::Credentials;
use boxtrack_persistence::{CredentialStore, Database, SqliteCredentialStore, TokenCipher};

fn cipher() -> TokenCipher {
    TokenCipher::from_passphrase("integration-test").unwrap()
}

#[tokio::test]
async fn tokens_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("credentials.db");

    {
        let db = Database::connect(&path).await.unwrap();
        let store = SqliteCredentialStore::new(db, cipher());
        store.save(&Credentials::new("a1", "r1")).await.unwrap();
        store.replace_access_token("a2").await.unwrap();
    }

    let db = Database::connect(&path).await.unwrap();
    let store = SqliteCredentialStore::new(db, cipher());
    assert!(store.has_refresh_token().await.unwrap());
    assert_eq!(
        store.load().await.unwrap(),
        Some(Credentials::new("a2", "r1"))
    );
}

#[tokio::test]
async fn clear_forgets_both_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::connect(&dir.path().join("credentials.db"))
        .await
        .unwrap();
    let store = SqliteCredentialStore::new(db, cipher());

    store.save(&Credentials::new("a1", "r1")).await.unwrap();
    store.clear().await.unwrap();

    assert!(store.load().await.unwrap().is_none());
    assert!(!store.has_refresh_token().await.unwrap());
}

#[tokio::test]
async fn save_replaces_previous_pair() {
    let db = Database::connect_in_memory().await.unwrap();
    let store = SqliteCredentialStore::new(db, cipher());

    store.save(&Credentials::new("a1", "r1")).await.unwrap();
    store.save(&Credentials::new("a3", "r3")).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.refresh_token, "r3");
    assert_eq!(loaded.access_token, "a3");
}

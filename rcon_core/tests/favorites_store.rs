use std::fs;

use rcon_core::storage::{
    favorites::FavoriteListing, ConnectionProfile, FavoritesStore, LoadStatus, RemoveOutcome,
    StorageError, DEFAULT_PORT,
};
use tempfile::TempDir;

mod common;
use common::scripted_prompter::ScriptedPrompter;

fn fresh_store() -> (TempDir, FavoritesStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let (store, status) = FavoritesStore::load(dir.path().join("settings.json"));
    assert!(matches!(status, LoadStatus::Missing));
    (dir, store)
}

#[test]
fn added_favorite_is_listed_once_without_its_password() -> anyhow::Result<()> {
    common::init_test_logging();
    let (_dir, mut store) = fresh_store();
    let mut prompter = ScriptedPrompter::new(&["pub", "tf.example.com", "27016"], &["hunter2"]);

    let saved = store.add(&mut prompter)?;

    assert_eq!(saved.as_deref(), Some("pub"));
    assert_eq!(
        store.list(),
        vec![FavoriteListing {
            alias: "pub",
            address: "tf.example.com",
            port: 27016,
        }]
    );
    assert!(!format!("{:?}", store.list()).contains("hunter2"));
    assert!(!format!("{store:?}").contains("hunter2"));
    assert_eq!(store.get("pub").map(|p| p.password.as_str()), Some("hunter2"));
    Ok(())
}

#[test]
fn list_is_sorted_by_alias() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    store.insert("zeta", ConnectionProfile::new("z.example", DEFAULT_PORT, "z"))?;
    store.insert("alpha", ConnectionProfile::new("a.example", DEFAULT_PORT, "a"))?;
    store.insert("mid", ConnectionProfile::new("m.example", DEFAULT_PORT, "m"))?;

    let aliases: Vec<&str> = store.list().iter().map(|l| l.alias).collect();
    assert_eq!(aliases, vec!["alpha", "mid", "zeta"]);
    Ok(())
}

#[test]
fn abort_at_collision_leaves_store_and_file_untouched() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    store.insert("pub", ConnectionProfile::new("old.example", 27015, "old"))?;
    let before = fs::read(store.path())?;

    let mut prompter = ScriptedPrompter::new(&["pub", "abort"], &[]);
    let saved = store.add(&mut prompter)?;

    assert_eq!(saved, None);
    assert_eq!(store.get("pub").map(|p| p.address.as_str()), Some("old.example"));
    assert_eq!(fs::read(store.path())?, before);
    assert!(prompter.exhausted());
    assert_eq!(prompter.notices.len(), 1);
    Ok(())
}

#[test]
fn declining_overwrite_asks_for_another_alias() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    store.insert("pub", ConnectionProfile::new("old.example", 27015, "old"))?;

    let mut prompter = ScriptedPrompter::new(
        &["pub", "n", "pub", "", "pub2", "new.example", ""],
        &["pw"],
    );
    let saved = store.add(&mut prompter)?;

    assert_eq!(saved.as_deref(), Some("pub2"));
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("pub").map(|p| p.address.as_str()), Some("old.example"));
    assert_eq!(store.get("pub2").map(|p| p.port), Some(DEFAULT_PORT));
    Ok(())
}

#[test]
fn confirming_overwrite_replaces_the_profile() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    store.insert("pub", ConnectionProfile::new("old.example", 27015, "old"))?;

    let mut prompter = ScriptedPrompter::new(&["pub", "yes", "new.example", "27020"], &["new"]);
    store.add(&mut prompter)?;

    assert_eq!(store.len(), 1);
    assert_eq!(
        store.get("pub"),
        Some(&ConnectionProfile::new("new.example", 27020, "new"))
    );
    Ok(())
}

#[test]
fn invalid_port_falls_back_to_default_with_a_warning() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    let mut prompter = ScriptedPrompter::new(&["pub", "tf.example.com", "twenty"], &["pw"]);

    let saved = store.add(&mut prompter)?;

    assert_eq!(saved.as_deref(), Some("pub"));
    assert_eq!(store.get("pub").map(|p| p.port), Some(DEFAULT_PORT));
    assert_eq!(
        prompter.notices,
        vec![format!("Invalid Port. Defaulting to {DEFAULT_PORT}.")]
    );
    Ok(())
}

#[test]
fn running_out_of_input_saves_nothing() {
    let (_dir, mut store) = fresh_store();
    let mut prompter = ScriptedPrompter::new(&["pub", "tf.example.com", "27015"], &[]);

    let err = store.add(&mut prompter).unwrap_err();

    assert!(matches!(err, StorageError::Input(_)));
    assert!(store.is_empty());
    assert!(!store.path().exists());
}

#[test]
fn deleting_twice_reports_removed_then_not_found() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    store.insert("pub", ConnectionProfile::new("tf.example.com", 27015, "pw"))?;

    assert_eq!(store.delete("pub")?, RemoveOutcome::Removed);
    assert_eq!(store.delete("pub")?, RemoveOutcome::NotFound);

    let (reloaded, _) = FavoritesStore::load(store.path());
    assert!(reloaded.is_empty());
    Ok(())
}

#[test]
fn save_then_reload_reproduces_the_store() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    store.insert("pub", ConnectionProfile::new("tf.example.com", 27015, "pw"))?;
    store.insert("scrim", ConnectionProfile::new("10.0.0.2", 27016, "s3"))?;

    let (reloaded, status) = FavoritesStore::load(store.path());

    assert!(matches!(status, LoadStatus::Loaded(2)));
    assert_eq!(reloaded, store);
    Ok(())
}

#[test]
fn persisted_document_matches_the_settings_schema() -> anyhow::Result<()> {
    let (_dir, mut store) = fresh_store();
    store.insert("pub", ConnectionProfile::new("tf.example.com", 27015, "pw"))?;

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
    assert_eq!(
        json,
        serde_json::json!({
            "version": 1,
            "favorites": {
                "pub": { "address": "tf.example.com", "port": 27015, "password": "pw" }
            }
        })
    );
    Ok(())
}

#[test]
fn legacy_string_ports_are_normalized() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{"version":1,"favorites":{"pub":{"address":"tf.example.com","port":"27016","password":"pw"}}}"#,
    )?;

    let (store, status) = FavoritesStore::load(&path);

    assert!(matches!(status, LoadStatus::Loaded(1)));
    assert_eq!(store.get("pub").map(|p| p.port), Some(27016));
    Ok(())
}

#[test]
fn corrupt_file_is_regenerated_not_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json")?;

    let (mut store, status) = FavoritesStore::load(&path);

    assert!(matches!(
        status,
        LoadStatus::Regenerate(StorageError::Malformed { .. })
    ));
    assert!(store.is_empty());

    store.insert("pub", ConnectionProfile::new("tf.example.com", 27015, "pw"))?;
    let (reloaded, status) = FavoritesStore::load(&path);
    assert!(matches!(status, LoadStatus::Loaded(1)));
    assert_eq!(reloaded, store);
    Ok(())
}

#[test]
fn unknown_document_version_is_regenerated() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"version":7,"favorites":{}}"#)?;

    let (_store, status) = FavoritesStore::load(&path);

    assert!(matches!(
        status,
        LoadStatus::Regenerate(StorageError::UnsupportedVersion { found: 7, .. })
    ));
    Ok(())
}

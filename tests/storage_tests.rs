//! Tests for the SQLite settings store.

use serde_json::json;
use valise::{SettingsStore, SqliteSettings};

#[test]
fn test_settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");

    {
        let store = SqliteSettings::open(&path).unwrap();
        store
            .save_setting("tickets-active", &json!([{ "finalized_ticket": "t1" }]))
            .unwrap();
        store.save_setting("last-sync-time", &json!(1234)).unwrap();
    }

    let store = SqliteSettings::open(&path).unwrap();
    assert_eq!(
        store.get_setting("tickets-active").unwrap(),
        Some(json!([{ "finalized_ticket": "t1" }]))
    );
    assert_eq!(
        store.get_setting("last-sync-time").unwrap(),
        Some(json!(1234))
    );
}

#[test]
fn test_overwrite_replaces_previous_value() {
    let store = SqliteSettings::in_memory().unwrap();
    store.save_setting("theme", &json!("light")).unwrap();
    store.save_setting("theme", &json!("dark")).unwrap();
    assert_eq!(store.get_setting("theme").unwrap(), Some(json!("dark")));
}

use rtext_core::DockRegion;
use rtext_settings::{Preferences, PreferencesStore};
use std::fs;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");

    let store = PreferencesStore::load(&path).expect("load defaults");
    let prefs = store.preferences();
    assert!(prefs.tasks.visible);
    assert_eq!(prefs.tasks.position, DockRegion::Bottom);
    assert_eq!(prefs.tasks.identifiers, vec!["TODO", "FIXME", "HACK"]);
    assert_eq!(prefs.dock.groups, vec![DockRegion::Bottom]);
    assert_eq!(prefs.logging.level, "warn");
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("preferences.json");

    let mut store = PreferencesStore::new(path.clone(), Preferences::default());
    store
        .update(|prefs| {
            prefs.tasks.visible = false;
            prefs.tasks.identifiers = vec!["XXX".to_string()];
            prefs.dock.groups = vec![DockRegion::Left, DockRegion::Right];
            prefs.logging.level = "debug".to_string();
        })
        .expect("save");
    assert!(!path.with_extension("tmp").exists());

    let reloaded = PreferencesStore::load(&path).expect("reload");
    let prefs = reloaded.preferences();
    assert!(!prefs.tasks.visible);
    assert_eq!(prefs.tasks.identifiers, vec!["XXX"]);
    assert_eq!(prefs.dock.groups, vec![DockRegion::Left, DockRegion::Right]);
    assert_eq!(prefs.logging.level, "debug");
}

#[test]
fn partial_file_is_filled_with_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(
        &path,
        r#"{
            "version": 0,
            "tasks": { "position": "right", "identifiers": ["  NOTE  ", ""] },
            "logging": { "level": "Trace" }
        }"#,
    )
    .expect("write partial prefs");

    let store = PreferencesStore::load(&path).expect("load partial file");
    let prefs = store.preferences();
    assert_eq!(prefs.version, 1);
    assert!(prefs.tasks.visible);
    assert_eq!(prefs.tasks.position, DockRegion::Right);
    assert_eq!(prefs.tasks.identifiers, vec!["NOTE"]);
    assert_eq!(prefs.dock.groups, vec![DockRegion::Bottom]);
    assert_eq!(prefs.logging.level, "trace");
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(&path, r#"{ "dock": { "groups": ["floating"] } }"#).expect("write");

    let err = PreferencesStore::load(&path).expect_err("unknown region must fail");
    assert!(err.to_string().contains("failed to parse preferences"));
}

#[test]
fn update_sanitizes_before_persisting() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");

    let mut store = PreferencesStore::load(&path).expect("load defaults");
    store
        .update(|prefs| {
            prefs.tasks.identifiers = vec![" NOTE ".to_string(), String::new()];
            prefs.dock.groups = vec![DockRegion::Right, DockRegion::Right];
        })
        .expect("update");
    assert_eq!(store.preferences().tasks.identifiers, vec!["NOTE"]);

    let on_disk: Preferences =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(on_disk.tasks.identifiers, vec!["NOTE"]);
    assert_eq!(on_disk.dock.groups, vec![DockRegion::Right]);
}

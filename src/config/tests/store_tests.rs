use super::super::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::core::{CommandCatalog, CommandCollection, CommandMemento, NoActions};

/// Helper: store for a snapshot path inside a temp dir (file not created)
fn create_test_store() -> (TempDir, PathBuf, SnapshotStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("commands.json");
    let store = SnapshotStore::new(path.clone()).unwrap();
    (temp_dir, path, store)
}

fn sample_collection() -> CommandCollection {
    let mut memento = CommandMemento::default();
    memento.set_key_gestures("Ctrl+O");
    memento.pointer_gesture = "UR".to_string();

    let mut commands = CommandCollection::new();
    commands.insert("OpenFile", memento);
    commands
}

#[test]
fn test_new_creates_backup_dir() {
    let (_temp_dir, path, store) = create_test_store();

    let backup_dir = path.parent().unwrap().join("backups");
    assert!(backup_dir.is_dir(), "Backup directory should be created");
    assert_eq!(store.backup_dir(), backup_dir);
    assert!(!store.exists());
}

#[test]
fn test_load_missing_snapshot() {
    let (_temp_dir, path, store) = create_test_store();

    match store.load() {
        Err(ConfigError::NotFound(missing)) => assert_eq!(missing, path),
        other => panic!("Expected NotFound error, got: {:?}", other),
    }
    assert_eq!(store.load_or_default().unwrap(), None);
}

#[test]
fn test_save_then_load() {
    let (_temp_dir, _path, store) = create_test_store();
    let commands = sample_collection();

    store.save(&commands).unwrap();

    assert_eq!(store.load().unwrap(), commands);
    assert!(store.list_backups().unwrap().is_empty(), "First save has nothing to back up");
}

#[test]
fn test_document_shape() {
    let text = SnapshotStore::render(&sample_collection()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["formatVersion"], 1);
    assert_eq!(value["commands"]["OpenFile"]["keyGestures"][0], "Ctrl+O");
    assert_eq!(value["commands"]["OpenFile"]["pointerGesture"], "UR");
}

#[test]
fn test_newer_format_is_rejected() {
    let (_temp_dir, path, store) = create_test_store();
    fs::write(&path, r#"{"formatVersion": 9, "commands": {}}"#).unwrap();

    assert!(matches!(
        store.load(),
        Err(ConfigError::UnsupportedVersion { found: 9, supported: 1 })
    ));
}

#[test]
fn test_missing_format_version_reads_as_current() {
    let (_temp_dir, path, store) = create_test_store();
    fs::write(&path, r#"{"commands": {"OpenFile": {"keyGestures": ["Ctrl+O"]}}}"#).unwrap();

    let commands = store.load().unwrap();
    let memento = commands.get("OpenFile").unwrap();
    assert_eq!(memento.key_gestures, vec!["Ctrl+O".to_string()]);
}

#[test]
fn test_invalid_json_is_a_parse_error() {
    let (_temp_dir, path, store) = create_test_store();
    fs::write(&path, "not json").unwrap();

    assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_builtin_snapshot_round_trip() {
    let (_temp_dir, _path, store) = create_test_store();
    let catalog = CommandCatalog::with_builtin_commands(&NoActions).unwrap();

    store.save(&catalog.create_memento()).unwrap();

    let mut restored = CommandCatalog::with_builtin_commands(&NoActions).unwrap();
    let report = restored.restore(&store.load().unwrap());
    assert!(report.skipped.is_empty());
    assert!(report.recovered.is_empty());
    assert_eq!(restored.create_memento(), catalog.create_memento());
}

#[test]
fn test_backup_timestamp_format() {
    let (_temp_dir, path, store) = create_test_store();
    fs::write(&path, "{}").unwrap();

    let backup_path = store.create_timestamped_backup().unwrap().unwrap();
    assert_eq!(backup_path.parent().unwrap(), store.backup_dir());

    // "commands.json.2025-10-10_221500"
    let filename = backup_path.file_name().unwrap().to_str().unwrap();
    let timestamp = filename.strip_prefix("commands.json.").unwrap();
    assert!(
        chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d_%H%M%S").is_ok(),
        "Timestamp should be valid chrono format: {}",
        timestamp,
    );
    assert_eq!(fs::read_to_string(&backup_path).unwrap(), "{}");
}

#[test]
fn test_no_backup_without_snapshot() {
    let (_temp_dir, _path, store) = create_test_store();
    assert_eq!(store.create_timestamped_backup().unwrap(), None);
}

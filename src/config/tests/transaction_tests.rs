// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::super::*;
use std::{fs, thread, time::Duration};
use tempfile::TempDir;

const ORIGINAL: &str = "{\"formatVersion\":1,\"commands\":{\"OpenFile\":{\"keyGestures\":[\"Ctrl+O\"]}}}\n";
const UPDATED: &str = "{\"formatVersion\":1,\"commands\":{\"OpenFile\":{\"keyGestures\":[\"Ctrl+P\"]}}}\n";

/// Helper: store with an existing snapshot
fn store_with_snapshot(content: &str) -> (TempDir, SnapshotStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("commands.json");
    fs::write(&path, content).unwrap();
    let store = SnapshotStore::new(path).unwrap();
    (temp_dir, store)
}

// ============================================================================
// SnapshotTransaction Tests
// ============================================================================

#[test]
fn test_transaction_basic_flow() {
    let (_temp_dir, store) = store_with_snapshot(ORIGINAL);

    // Begin transaction (creates backup)
    let tx = SnapshotTransaction::begin(&store).unwrap();
    assert_eq!(store.list_backups().unwrap().len(), 1, "Should have created one backup");

    tx.commit(UPDATED).unwrap();

    assert_eq!(fs::read_to_string(store.path()).unwrap(), UPDATED);

    // Backup is kept after commit
    let backups = store.list_backups().unwrap();
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), ORIGINAL);
}

#[test]
fn test_rollback_restores_original() {
    let (_temp_dir, store) = store_with_snapshot(ORIGINAL);

    let tx = SnapshotTransaction::begin(&store).unwrap();
    fs::write(store.path(), "corrupted").unwrap();

    tx.rollback().unwrap();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), ORIGINAL);

    // Rollback can be repeated
    tx.rollback().unwrap();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), ORIGINAL);
}

#[test]
fn test_rollback_without_previous_snapshot_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path().join("commands.json")).unwrap();

    let tx = SnapshotTransaction::begin(&store).unwrap();
    assert!(tx.backup_path().is_none());
    fs::write(store.path(), UPDATED).unwrap();

    tx.rollback().unwrap();
    assert!(!store.exists());
}

#[test]
fn test_commit_with_validation_accepts_valid_snapshot() {
    let (_temp_dir, store) = store_with_snapshot(ORIGINAL);

    SnapshotTransaction::begin(&store)
        .unwrap()
        .commit_with_validation(UPDATED)
        .unwrap();

    assert_eq!(fs::read_to_string(store.path()).unwrap(), UPDATED);
}

#[test]
fn test_commit_with_validation_blocks_invalid_names() {
    let (_temp_dir, store) = store_with_snapshot(ORIGINAL);
    let invalid = "{\"formatVersion\":1,\"commands\":{\" Padded\":{}}}";

    let result = SnapshotTransaction::begin(&store)
        .unwrap()
        .commit_with_validation(invalid);

    assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    assert_eq!(
        fs::read_to_string(store.path()).unwrap(),
        ORIGINAL,
        "Original snapshot must be untouched"
    );
}

#[test]
fn test_commit_with_validation_blocks_undecodable_document() {
    let (_temp_dir, store) = store_with_snapshot(ORIGINAL);

    let result = SnapshotTransaction::begin(&store)
        .unwrap()
        .commit_with_validation("{\"commands\": []}");

    assert!(matches!(result, Err(ConfigError::Parse { .. })));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), ORIGINAL);
}

#[test]
fn test_commit_allows_warnings() {
    let (_temp_dir, store) = store_with_snapshot(ORIGINAL);
    let conflicting = "{\"formatVersion\":1,\"commands\":{\
        \"NextPage\":{\"keyGestures\":[\"Right\"]},\
        \"PrevPage\":{\"keyGestures\":[\"Right\"]}}}";

    SnapshotTransaction::begin(&store)
        .unwrap()
        .commit_with_validation(conflicting)
        .unwrap();

    assert_eq!(store.load().unwrap().len(), 2);
}

#[test]
fn test_multiple_transactions_keep_separate_backups() {
    let (_temp_dir, store) = store_with_snapshot(ORIGINAL);

    SnapshotTransaction::begin(&store).unwrap().commit(UPDATED).unwrap();

    // Wait 1 second to ensure a different timestamp
    thread::sleep(Duration::from_secs(1));

    SnapshotTransaction::begin(&store).unwrap().commit(ORIGINAL).unwrap();

    let backups = store.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), ORIGINAL);
    assert_eq!(fs::read_to_string(&backups[1]).unwrap(), UPDATED);
}

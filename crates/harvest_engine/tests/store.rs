use std::fs;

use harvest_core::{CandidateLink, ProcessedSet};
use harvest_engine::{ProcessedStore, StoreError};
use tempfile::TempDir;

fn sample_set() -> ProcessedSet {
    ProcessedSet::from_links([
        CandidateLink::from_normalized("https://example.org/abs/2"),
        CandidateLink::from_normalized("https://example.org/abs/1"),
    ])
}

#[test]
fn missing_record_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = ProcessedStore::new(dir.path(), "processed.json");

    let set = store.load().unwrap();
    assert!(set.is_empty());
}

#[test]
fn persist_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = ProcessedStore::new(dir.path(), "processed.json");

    store.persist(&sample_set()).unwrap();
    let restored = store.load().unwrap();
    assert_eq!(restored, sample_set());

    // The record is plain versioned JSON, inspectable by hand.
    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"version\": 1"));
    assert!(raw.contains("https://example.org/abs/1"));
}

#[test]
fn corrupt_record_is_fatal_not_empty() {
    let dir = TempDir::new().unwrap();
    let store = ProcessedStore::new(dir.path(), "processed.json");
    fs::write(store.path(), "{ definitely not json").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "got {err:?}");
}

#[test]
fn future_record_versions_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = ProcessedStore::new(dir.path(), "processed.json");
    fs::write(store.path(), r#"{"version":2,"processed":[]}"#).unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedVersion(2)), "got {err:?}");
}

#[test]
fn persist_replaces_previous_record() {
    let dir = TempDir::new().unwrap();
    let store = ProcessedStore::new(dir.path(), "processed.json");

    store.persist(&sample_set()).unwrap();
    let mut grown = sample_set();
    grown.insert(CandidateLink::from_normalized("https://example.org/abs/3"));
    store.persist(&grown).unwrap();

    assert_eq!(store.load().unwrap(), grown);

    // The replacement is a single rename over the old record: afterwards the
    // cache directory holds exactly the record, no temp files and no gap
    // where the old record was unlinked separately.
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["processed.json"]);
}

#[test]
fn failed_persist_leaves_no_record() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let store = ProcessedStore::new(&blocker, "processed.json");
    assert!(store.persist(&sample_set()).is_err());
    assert!(!blocker.join("processed.json").exists());
}

#[test]
fn lock_blocks_a_second_runner() {
    let dir = TempDir::new().unwrap();
    let store = ProcessedStore::new(dir.path(), "processed.json");

    let guard = store.lock().unwrap();
    let err = store.lock().unwrap_err();
    assert!(matches!(err, StoreError::Locked(_)), "got {err:?}");

    drop(guard);
    store.lock().expect("lock released on drop");
}

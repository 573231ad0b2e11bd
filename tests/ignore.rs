//! Integration tests for the JSON ignore store

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use packsync::error::Error;
use packsync::ignore::{IgnoreList, IgnoredUser};

/// Create a temp directory and a path for the ignore file inside it
fn setup_ignore_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ignored-ids.json");
    (dir, path)
}

fn record(did: &str, handle: &str) -> IgnoredUser {
    IgnoredUser {
        did: did.to_string(),
        handle: handle.to_string(),
    }
}

#[test]
fn test_load_missing_file_creates_empty_store() {
    let (_dir, path) = setup_ignore_file();

    let list = IgnoreList::load(&path).unwrap();
    assert!(list.is_empty());

    // The file now exists holding the empty state, so a second load
    // succeeds without special-casing.
    assert!(path.exists());
    let reloaded = IgnoreList::load(&path).unwrap();
    assert!(reloaded.is_empty());
}

#[test]
fn test_round_trip_empty() {
    let (_dir, path) = setup_ignore_file();

    let list = IgnoreList::new();
    list.save(&path).unwrap();

    let loaded = IgnoreList::load(&path).unwrap();
    assert_eq!(loaded, list);
}

#[test]
fn test_round_trip_singleton() {
    let (_dir, path) = setup_ignore_file();

    let mut list = IgnoreList::new();
    list.push(record("did:plc:abc", "alice.bsky.social"));
    list.save(&path).unwrap();

    let loaded = IgnoreList::load(&path).unwrap();
    assert_eq!(loaded, list);
    assert!(loaded.contains("did:plc:abc"));
}

#[test]
fn test_round_trip_duplicate_handles_distinct_dids() {
    let (_dir, path) = setup_ignore_file();

    let mut list = IgnoreList::new();
    list.push(record("did:plc:one", "renamed.bsky.social"));
    list.push(record("did:plc:two", "renamed.bsky.social"));
    list.save(&path).unwrap();

    let loaded = IgnoreList::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.contains("did:plc:one"));
    assert!(loaded.contains("did:plc:two"));
}

/// Saving a shorter collection must fully truncate the previous content:
/// the file's byte length must exactly match the new serialization.
#[test]
fn test_save_truncates_longer_previous_content() {
    let (_dir, path) = setup_ignore_file();

    let mut long = IgnoreList::new();
    for i in 0..25 {
        long.push(record(
            &format!("did:plc:padding-{i:04}"),
            &format!("padding-{i:04}.bsky.social"),
        ));
    }
    long.save(&path).unwrap();
    let long_len = fs::metadata(&path).unwrap().len();

    let mut short = IgnoreList::new();
    short.push(record("did:plc:only", "only.bsky.social"));
    short.save(&path).unwrap();

    let expected = {
        let mut s = serde_json::to_string_pretty(&[record("did:plc:only", "only.bsky.social")])
            .unwrap();
        s.push('\n');
        s
    };
    let on_disk = fs::read_to_string(&path).unwrap();
    assert_eq!(on_disk, expected);
    assert_eq!(on_disk.len() as u64, fs::metadata(&path).unwrap().len());
    assert!(fs::metadata(&path).unwrap().len() < long_len);

    let loaded = IgnoreList::load(&path).unwrap();
    assert_eq!(loaded, short);
}

#[test]
fn test_save_uses_two_space_indentation() {
    let (_dir, path) = setup_ignore_file();

    let mut list = IgnoreList::new();
    list.push(record("did:plc:abc", "alice.bsky.social"));
    list.save(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("  {"));
    assert!(content.contains("    \"did\": \"did:plc:abc\""));
}

#[test]
fn test_load_rejects_empty_file() {
    let (_dir, path) = setup_ignore_file();
    fs::write(&path, "").unwrap();

    let result = IgnoreList::load(&path);
    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[test]
fn test_load_rejects_invalid_json() {
    let (_dir, path) = setup_ignore_file();
    fs::write(&path, "{ not json ]").unwrap();

    let result = IgnoreList::load(&path);
    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[test]
fn test_load_rejects_wrong_shape() {
    let (_dir, path) = setup_ignore_file();
    fs::write(&path, r#"{"did": "did:plc:abc"}"#).unwrap();

    let result = IgnoreList::load(&path);
    assert!(matches!(result, Err(Error::Decode { .. })));
}

/// Readers accept any whitespace layout, not just the canonical
/// pretty-printed form.
#[test]
fn test_load_accepts_compact_json() {
    let (_dir, path) = setup_ignore_file();
    fs::write(
        &path,
        r#"[{"did":"did:plc:abc","handle":"alice.bsky.social"}]"#,
    )
    .unwrap();

    let loaded = IgnoreList::load(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.contains("did:plc:abc"));
}

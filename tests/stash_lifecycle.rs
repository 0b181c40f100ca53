//! Library-level integration tests covering the engine's end-to-end
//! lifecycle scenarios against the Embedded-JSON backend.
mod common;

use ghost_stash::record::PASSPHRASE_PROBE_NAME;
use ghost_stash::stash::{PutRequest, Stash};
use ghost_stash::storage::embedded_json::EmbeddedJsonStorage;
use ghost_stash::storage::StorageBackend;
use serde_json::json;

use common::test_dir;

#[test]
fn init_writes_probe_at_id_one() {
    let dir = test_dir().unwrap();
    let path = dir.path().join("stash.json");

    let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
    Stash::init(backend, Some("pw".to_string())).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let table = value["_default"].as_object().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table["1"]["name"], PASSPHRASE_PROBE_NAME);
}

#[test]
fn put_assigns_next_id_and_keeps_shape() {
    let dir = test_dir().unwrap();
    let path = dir.path().join("stash.json");

    let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
    Stash::init(backend, Some("pw".to_string())).unwrap();

    let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
    let stash = Stash::open(backend, "pw").unwrap();
    let id = stash
        .put(
            "aws",
            PutRequest {
                value: Some(json!({"key": "value"})),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(id, "2");

    let record = stash.get("aws", true).unwrap().unwrap();
    assert_eq!(record.description, None);
    assert_eq!(record.metadata, None);
    assert_eq!(record.value, json!({"key": "value"}));
}

#[test]
fn modify_after_delay_advances_modified_at_only() {
    let dir = test_dir().unwrap();
    let path = dir.path().join("stash.json");

    let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
    Stash::init(backend, Some("pw".to_string())).unwrap();
    let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
    let stash = Stash::open(backend, "pw").unwrap();

    stash
        .put(
            "aws",
            PutRequest {
                value: Some(json!({"key": "value"})),
                ..Default::default()
            },
        )
        .unwrap();
    let before = stash.get("aws", true).unwrap().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(1100));

    stash
        .put(
            "aws",
            PutRequest {
                value: Some(json!({"modified_key": "modified_value"})),
                modify: true,
                ..Default::default()
            },
        )
        .unwrap();
    let after = stash.get("aws", true).unwrap().unwrap();

    assert_eq!(before.created_at, after.created_at);
    assert!(after.modified_at >= before.modified_at);
    assert_eq!(after.value, json!({"modified_key": "modified_value"}));
}

#[test]
fn get_ciphertext_never_equals_plaintext() {
    let dir = test_dir().unwrap();
    let path = dir.path().join("stash.json");
    let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
    Stash::init(backend, Some("pw".to_string())).unwrap();
    let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
    let stash = Stash::open(backend, "pw").unwrap();

    stash
        .put(
            "aws",
            PutRequest {
                value: Some(json!({"key": "value"})),
                ..Default::default()
            },
        )
        .unwrap();

    let plain = stash.get("aws", true).unwrap().unwrap();
    let cipher = stash.get("aws", false).unwrap().unwrap();
    assert_ne!(plain.value, cipher.value);
}

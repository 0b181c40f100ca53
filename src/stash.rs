//! The Stash Engine (component D, the core) — mediates every read and
//! write, enforces the cryptographic envelope, validates the passphrase,
//! maintains record invariants, and delegates persistence to a
//! [`StorageBackend`].

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::cipher::Cipher;
use crate::error::StashError;
use crate::record::{Document, KeyRecord, PASSPHRASE_PROBE_NAME};
use crate::storage::{Backend, StorageBackend};

/// The plaintext placed in the passphrase probe record; its value carries
/// no meaning of its own, only its successful decryption does.
const PROBE_PLAINTEXT_KEY: &str = "ghost";
const PROBE_PLAINTEXT_VALUE: &str = "stash";

const GENERATED_PASSPHRASE_LEN: usize = 12;

/// Returns the current UTC time as a 19-character `YYYY-MM-DD HH:MM:SS`
/// timestamp — the format every `created_at`/`modified_at` field uses.
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Generate a random alphanumeric passphrase. Defaults to 12 characters,
/// honouring an explicit `length` override.
pub fn generate_passphrase(length: Option<usize>) -> String {
    let len = length.unwrap_or(GENERATED_PASSPHRASE_LEN);
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Everything the engine needs to act on one key: the new value, and the
/// optional description/metadata overrides. `value: None` on a `modify`
/// means "keep the existing value".
#[derive(Debug, Clone, Default)]
pub struct PutRequest {
    pub value: Option<Value>,
    pub modify: bool,
    pub description: Option<String>,
    pub metadata: Option<std::collections::BTreeMap<String, String>>,
}

pub struct Stash {
    backend: StorageBackend,
    cipher: Cipher,
}

impl Stash {
    /// Initialise a fresh stash: initialise the backend, derive the cipher
    /// key, and write the passphrase probe. `passphrase` must be supplied
    /// non-empty by the caller, or omitted to auto-generate one.
    pub fn init(backend: StorageBackend, passphrase: Option<String>) -> Result<String, StashError> {
        if let Some(p) = &passphrase {
            if p.is_empty() {
                return Err(StashError::InvalidPassphrase);
            }
        }
        let effective = passphrase.unwrap_or_else(|| generate_passphrase(None));

        backend.init()?;

        let cipher = Cipher::derive(&effective)?;
        let now = current_timestamp();
        let mut probe_value = Map::new();
        probe_value.insert(PROBE_PLAINTEXT_KEY.to_string(), Value::String(PROBE_PLAINTEXT_VALUE.to_string()));

        let ciphertext = cipher.encrypt_value(&Value::Object(probe_value))?;
        let probe = Document {
            name: PASSPHRASE_PROBE_NAME.to_string(),
            value: ciphertext,
            description: None,
            metadata: None,
            uid: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            modified_at: now,
        };
        backend.put(&probe)?;

        Ok(effective)
    }

    /// Open an existing stash. Passphrase validity is checked lazily: the
    /// probe is read here but actual decryption is deferred to the first
    /// operation that needs the cipher, per the engine's contract.
    pub fn open(backend: StorageBackend, passphrase: &str) -> Result<Self, StashError> {
        if passphrase.is_empty() {
            return Err(StashError::InvalidPassphrase);
        }
        let cipher = Cipher::derive(passphrase)?;
        let stash = Self { backend, cipher };
        stash.verify_passphrase()?;
        Ok(stash)
    }

    fn verify_passphrase(&self) -> Result<(), StashError> {
        let probe = self
            .backend
            .get(PASSPHRASE_PROBE_NAME)
            .map_err(|_| StashError::InvalidPassphrase)?
            .ok_or(StashError::InvalidPassphrase)?;
        self.cipher
            .decrypt_value(&probe.value)
            .map_err(|_| StashError::InvalidPassphrase)?;
        Ok(())
    }

    pub fn put(&self, name: &str, req: PutRequest) -> Result<String, StashError> {
        if name.is_empty() || name == PASSPHRASE_PROBE_NAME {
            return Err(StashError::InvalidKeyName(name.to_string()));
        }

        let existing = self.backend.get(name)?;
        let now = current_timestamp();

        let doc = match existing {
            Some(_) if !req.modify => {
                return Err(StashError::KeyExists);
            }
            Some(current) => {
                let value = match req.value {
                    Some(v) => v,
                    None => self.cipher.decrypt_value(&current.value)?,
                };
                let description = req.description.or(current.description.clone());
                let metadata = req.metadata.or_else(|| current.metadata.clone());
                let ciphertext = self.cipher.encrypt_value(&value)?;
                Document {
                    name: name.to_string(),
                    value: ciphertext,
                    description,
                    metadata,
                    uid: current.uid.clone(),
                    created_at: current.created_at.clone(),
                    modified_at: now,
                }
            }
            None if req.modify => {
                return Err(StashError::KeyNotFoundForModify(format!("Key {name} not found")));
            }
            None => {
                let value = req.value.ok_or(StashError::MissingValue)?;
                if !value.is_object() {
                    return Err(StashError::InvalidValueType);
                }
                let ciphertext = self.cipher.encrypt_value(&value)?;
                Document {
                    name: name.to_string(),
                    value: ciphertext,
                    description: req.description,
                    metadata: req.metadata,
                    uid: Uuid::new_v4().to_string(),
                    created_at: now.clone(),
                    modified_at: now,
                }
            }
        };

        self.backend.put(&doc)
    }

    pub fn get(&self, name: &str, decrypt: bool) -> Result<Option<KeyRecord>, StashError> {
        let Some(doc) = self.backend.get(name)? else {
            return Ok(None);
        };
        let value = if decrypt {
            self.cipher.decrypt_value(&doc.value)?
        } else {
            Value::String(doc.value.clone())
        };
        Ok(Some(KeyRecord {
            name: doc.name,
            value,
            description: doc.description,
            metadata: doc.metadata,
            uid: doc.uid,
            created_at: doc.created_at,
            modified_at: doc.modified_at,
        }))
    }

    pub fn delete(&self, name: &str) -> Result<(), StashError> {
        if name == PASSPHRASE_PROBE_NAME {
            return Err(StashError::KeyNotFound(name.to_string()));
        }
        if self.backend.delete(name)? {
            Ok(())
        } else {
            Err(StashError::KeyNotFound(name.to_string()))
        }
    }

    pub fn list(&self) -> Result<Vec<String>, StashError> {
        Ok(self
            .backend
            .list()?
            .into_iter()
            .filter(|doc| !doc.is_probe())
            .map(|doc| doc.name)
            .collect())
    }

    pub fn purge(&self, force: bool) -> Result<(), StashError> {
        if !force {
            return Err(StashError::ForceRequired);
        }
        for doc in self.backend.list()? {
            if !doc.is_probe() {
                self.backend.delete(&doc.name)?;
            }
        }
        Ok(())
    }

    /// Collect every user-visible record in on-backend (ciphertext) form.
    pub fn export(&self) -> Result<Vec<Document>, StashError> {
        let docs: Vec<Document> = self
            .backend
            .list()?
            .into_iter()
            .filter(|doc| !doc.is_probe())
            .collect();
        if docs.is_empty() {
            return Err(StashError::EmptyExport);
        }
        Ok(docs)
    }

    /// Load previously-exported documents back in verbatim, without
    /// re-encrypting: the ciphertext is only meaningful under the
    /// passphrase the export was produced with.
    pub fn load(&self, docs: Vec<Document>) -> Result<(), StashError> {
        for doc in docs {
            if doc.is_probe() {
                continue;
            }
            self.backend.put(&doc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::embedded_json::EmbeddedJsonStorage;
    use serde_json::json;

    fn fresh_stash(dir: &std::path::Path, passphrase: &str) -> Stash {
        let path = dir.join("stash.json");
        let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
        Stash::init(backend, Some(passphrase.to_string())).unwrap();
        let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
        Stash::open(backend, passphrase).unwrap()
    }

    #[test]
    fn init_writes_probe_and_open_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "correct-horse");
        assert!(stash.list().unwrap().is_empty());
    }

    #[test]
    fn open_with_wrong_passphrase_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stash.json");
        let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
        Stash::init(backend, Some("right".to_string())).unwrap();

        let backend = StorageBackend::new(EmbeddedJsonStorage::new(&path));
        assert!(matches!(Stash::open(backend, "wrong"), Err(StashError::InvalidPassphrase)));
    }

    #[test]
    fn put_then_get_roundtrips_value() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        stash
            .put(
                "aws",
                PutRequest {
                    value: Some(json!({"key": "value"})),
                    ..Default::default()
                },
            )
            .unwrap();

        let record = stash.get("aws", true).unwrap().unwrap();
        assert_eq!(record.value, json!({"key": "value"}));
        assert_eq!(record.description, None);
        assert_eq!(record.metadata, None);
    }

    #[test]
    fn put_existing_without_modify_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        let req = PutRequest {
            value: Some(json!({"k": "v"})),
            ..Default::default()
        };
        stash.put("aws", req.clone()).unwrap();
        assert!(matches!(stash.put("aws", req), Err(StashError::KeyExists)));
    }

    #[test]
    fn modify_preserves_created_at_and_uid() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        stash
            .put(
                "aws",
                PutRequest {
                    value: Some(json!({"k": "v1"})),
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
                    value: Some(json!({"k": "v2"})),
                    modify: true,
                    ..Default::default()
                },
            )
            .unwrap();
        let after = stash.get("aws", true).unwrap().unwrap();

        assert_eq!(before.created_at, after.created_at);
        assert_eq!(before.uid, after.uid);
        assert!(after.modified_at >= before.modified_at);
        assert_eq!(after.value, json!({"k": "v2"}));
    }

    #[test]
    fn modify_nonexistent_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        let result = stash.put(
            "missing",
            PutRequest {
                value: Some(json!({"k": "v"})),
                modify: true,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StashError::KeyNotFoundForModify(_))));
    }

    #[test]
    fn put_without_value_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        assert!(matches!(
            stash.put("aws", PutRequest::default()),
            Err(StashError::MissingValue)
        ));
    }

    #[test]
    fn put_reserved_name_fails_with_invalid_key_name() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        let result = stash.put(
            PASSPHRASE_PROBE_NAME,
            PutRequest {
                value: Some(json!({"k": "v"})),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StashError::InvalidKeyName(_))));
    }

    #[test]
    fn put_non_object_value_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        let result = stash.put(
            "aws",
            PutRequest {
                value: Some(json!("not-an-object")),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StashError::InvalidValueType)));
    }

    #[test]
    fn list_excludes_probe() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        stash
            .put(
                "aws",
                PutRequest {
                    value: Some(json!({"k": "v"})),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(stash.list().unwrap(), vec!["aws".to_string()]);
    }

    #[test]
    fn purge_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        assert!(matches!(stash.purge(false), Err(StashError::ForceRequired)));
    }

    #[test]
    fn purge_clears_keys_but_keeps_probe() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        stash
            .put(
                "aws",
                PutRequest {
                    value: Some(json!({"k": "v"})),
                    ..Default::default()
                },
            )
            .unwrap();
        stash.purge(true).unwrap();
        assert!(stash.list().unwrap().is_empty());
        assert!(stash.get(PASSPHRASE_PROBE_NAME, false).unwrap().is_some());
    }

    #[test]
    fn export_empty_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        assert!(matches!(stash.export(), Err(StashError::EmptyExport)));
    }

    #[test]
    fn export_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        stash
            .put(
                "aws",
                PutRequest {
                    value: Some(json!({"k": "v"})),
                    ..Default::default()
                },
            )
            .unwrap();
        let exported = stash.export().unwrap();

        let other_dir = tempfile::tempdir().unwrap();
        let other = fresh_stash(other_dir.path(), "pw");
        other.load(exported).unwrap();

        let record = other.get("aws", true).unwrap().unwrap();
        assert_eq!(record.value, json!({"k": "v"}));
    }

    #[test]
    fn delete_missing_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        assert!(matches!(stash.delete("nope"), Err(StashError::KeyNotFound(_))));
    }

    #[test]
    fn get_with_decrypt_false_returns_ciphertext() {
        let dir = tempfile::tempdir().unwrap();
        let stash = fresh_stash(dir.path(), "pw");
        stash
            .put(
                "aws",
                PutRequest {
                    value: Some(json!({"k": "v"})),
                    ..Default::default()
                },
            )
            .unwrap();
        let record = stash.get("aws", false).unwrap().unwrap();
        assert_ne!(record.value, json!({"k": "v"}));
    }

    #[test]
    fn current_timestamp_has_19_chars() {
        assert_eq!(current_timestamp().len(), 19);
    }

    #[test]
    fn generate_passphrase_defaults_to_12_chars() {
        assert_eq!(generate_passphrase(None).len(), 12);
        assert_eq!(generate_passphrase(Some(20)).len(), 20);
    }
}

//! Canonical record shape (component C).
//!
//! A [`KeyRecord`] is what callers of the engine see; a [`Document`] is the
//! same data shaped for a storage backend, with `value` already reduced to
//! an opaque ciphertext string. Backends never interpret `value` — only
//! the [`crate::stash::Stash`] encrypts/decrypts it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PASSPHRASE_PROBE_NAME: &str = "stored_passphrase";

/// A document as stored by a backend. `value` is the Base64-encoded
/// ciphertext token produced by [`crate::cipher::Cipher::encrypt_value`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub metadata: Option<std::collections::BTreeMap<String, String>>,
    pub uid: String,
    pub created_at: String,
    pub modified_at: String,
}

/// A record with `value` decrypted back into a mapping, as returned by
/// [`crate::stash::Stash::get`] with `decrypt = true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyRecord {
    pub name: String,
    pub value: Value,
    pub description: Option<String>,
    pub metadata: Option<std::collections::BTreeMap<String, String>>,
    pub uid: String,
    pub created_at: String,
    pub modified_at: String,
}

impl Document {
    /// True for the reserved passphrase-probe record.
    pub fn is_probe(&self) -> bool {
        self.name == PASSPHRASE_PROBE_NAME
    }
}

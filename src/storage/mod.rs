//! Storage Backend (component B).
//!
//! A single abstraction, three variants, modelled as a sealed enum rather
//! than the original's runtime duck typing (spec §9, "Backend
//! polymorphism"): the engine holds a [`StorageBackend`] by value and
//! dispatches through the [`Backend`] trait, never by concrete type.
//! Each variant's crate may be compiled out; selecting an unavailable one
//! fails with [`StashError::BackendUnavailable`] (spec §9, "Optional
//! dependencies").

pub mod embedded_json;
#[cfg(feature = "relational")]
pub mod relational;
#[cfg(feature = "remote-kv")]
pub mod remote_kv;

use crate::error::StashError;
use crate::record::Document;

/// The identifier a backend hands back from `put`. Embedded-JSON and
/// Relational return an auto-incrementing integer (stringified);
/// Remote-KV has no insertion counter and returns the record's own name.
pub type BackendId = String;

/// Operations every storage backend implements identically, regardless of
/// physical medium.
pub trait Backend {
    /// Create the backing medium. Fails with `AlreadyInitialized` if it
    /// already carries a stash schema.
    fn init(&self) -> Result<(), StashError>;

    /// Persist `doc`, keyed by its (caller-guaranteed unique) `name`.
    fn put(&self, doc: &Document) -> Result<BackendId, StashError>;

    /// Fetch the document named `name`, or `None` if absent.
    fn get(&self, name: &str) -> Result<Option<Document>, StashError>;

    /// All documents, in the backend's natural insertion order.
    fn list(&self) -> Result<Vec<Document>, StashError>;

    /// Remove the document named `name`. Returns whether one existed.
    fn delete(&self, name: &str) -> Result<bool, StashError>;
}

/// Which backend variant to use — resolved from `GHOST_BACKEND_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    EmbeddedJson,
    Relational,
    RemoteKv,
}

impl BackendKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tinydb" => Some(Self::EmbeddedJson),
            "sqlalchemy" => Some(Self::Relational),
            "consul" => Some(Self::RemoteKv),
            _ => None,
        }
    }

    pub fn as_env_value(&self) -> &'static str {
        match self {
            Self::EmbeddedJson => "tinydb",
            Self::Relational => "sqlalchemy",
            Self::RemoteKv => "consul",
        }
    }
}

/// A concrete backend, boxed behind a trait object so [`crate::stash::Stash`]
/// does not need to be generic.
pub struct StorageBackend(Box<dyn Backend>);

impl StorageBackend {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self(Box::new(backend))
    }
}

impl Backend for StorageBackend {
    fn init(&self) -> Result<(), StashError> {
        self.0.init()
    }

    fn put(&self, doc: &Document) -> Result<BackendId, StashError> {
        self.0.put(doc)
    }

    fn get(&self, name: &str) -> Result<Option<Document>, StashError> {
        self.0.get(name)
    }

    fn list(&self) -> Result<Vec<Document>, StashError> {
        self.0.list()
    }

    fn delete(&self, name: &str) -> Result<bool, StashError> {
        self.0.delete(name)
    }
}

/// Configuration for the Remote-KV backend's base URL and key prefix
/// (spec §9, "Globals" — configuration with a default, not a constant).
#[derive(Debug, Clone)]
pub struct RemoteKvConfig {
    pub host: String,
    pub port: u16,
    pub prefix: String,
}

impl Default for RemoteKvConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8500,
            prefix: "ghost".to_string(),
        }
    }
}

/// Open the requested backend variant against `location` (a filesystem
/// path for Embedded-JSON/Relational; unused for Remote-KV, which is
/// configured via `remote_cfg` instead).
pub fn open_backend(
    kind: BackendKind,
    location: &str,
    remote_cfg: RemoteKvConfig,
) -> Result<StorageBackend, StashError> {
    match kind {
        BackendKind::EmbeddedJson => Ok(StorageBackend::new(
            embedded_json::EmbeddedJsonStorage::new(location),
        )),
        BackendKind::Relational => {
            #[cfg(feature = "relational")]
            {
                Ok(StorageBackend::new(relational::RelationalStorage::new(location)?))
            }
            #[cfg(not(feature = "relational"))]
            {
                Err(StashError::BackendUnavailable { backend: "relational".to_string() })
            }
        }
        BackendKind::RemoteKv => {
            #[cfg(feature = "remote-kv")]
            {
                Ok(StorageBackend::new(remote_kv::RemoteKvStorage::new(remote_cfg)))
            }
            #[cfg(not(feature = "remote-kv"))]
            {
                Err(StashError::BackendUnavailable { backend: "remote-kv".to_string() })
            }
        }
    }
}

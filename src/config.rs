//! Process-environment configuration (external collaborator, spec §6):
//! resolves the stash location, passphrase, and backend type from the
//! environment, loading a local `.env` file first the way the teacher's
//! `core::config` loads `.evnx.toml`.

use std::env;
use std::path::PathBuf;

use crate::error::StashError;
use crate::storage::{BackendKind, RemoteKvConfig};

const STASH_PATH_VAR: &str = "GHOST_STASH_PATH";
const PASSPHRASE_VAR: &str = "GHOST_PASSPHRASE";
const BACKEND_TYPE_VAR: &str = "GHOST_BACKEND_TYPE";
const REMOTE_HOST_VAR: &str = "GHOST_REMOTE_HOST";
const REMOTE_PORT_VAR: &str = "GHOST_REMOTE_PORT";
const REMOTE_PREFIX_VAR: &str = "GHOST_REMOTE_PREFIX";

const DEFAULT_STASH_PATH: &str = "stash.json";

/// Resolved process configuration handed to the Stash Engine.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub stash_path: String,
    pub passphrase: Option<String>,
    pub backend_kind: BackendKind,
    pub remote_kv: RemoteKvConfig,
}

impl EnvConfig {
    /// Load `.env` (if present) then resolve each variable, falling back
    /// to documented defaults where the spec allows one.
    pub fn resolve() -> Result<Self, StashError> {
        // Best-effort: a missing .env file is not an error.
        let _ = dotenvy::dotenv();

        let stash_path = env::var(STASH_PATH_VAR).unwrap_or_else(|_| DEFAULT_STASH_PATH.to_string());
        let passphrase = env::var(PASSPHRASE_VAR).ok().filter(|p| !p.is_empty());

        let backend_kind = match env::var(BACKEND_TYPE_VAR) {
            Ok(raw) => BackendKind::parse(&raw).ok_or_else(|| {
                StashError::BackendFailure(anyhow::anyhow!(
                    "unrecognised {BACKEND_TYPE_VAR} value '{raw}' (expected tinydb, sqlalchemy, or consul)"
                ))
            })?,
            Err(_) => BackendKind::EmbeddedJson,
        };

        let mut remote_kv = RemoteKvConfig::default();
        if let Ok(host) = env::var(REMOTE_HOST_VAR) {
            remote_kv.host = host;
        }
        if let Ok(port) = env::var(REMOTE_PORT_VAR) {
            remote_kv.port = port
                .parse()
                .map_err(|_| StashError::BackendFailure(anyhow::anyhow!("{REMOTE_PORT_VAR} must be a port number")))?;
        }
        if let Ok(prefix) = env::var(REMOTE_PREFIX_VAR) {
            remote_kv.prefix = prefix;
        }

        Ok(Self {
            stash_path,
            passphrase,
            backend_kind,
            remote_kv,
        })
    }

    /// Path to the `passphrase.ghost` sidecar, colocated with the stash
    /// file (or, for non-file backends, with the current directory).
    pub fn passphrase_sidecar_path(&self) -> PathBuf {
        let parent = PathBuf::from(&self.stash_path)
            .parent()
            .map(|p| p.to_path_buf())
            .filter(|p| !p.as_os_str().is_empty());
        match parent {
            Some(dir) => dir.join("passphrase.ghost"),
            None => PathBuf::from("passphrase.ghost"),
        }
    }
}

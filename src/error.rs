//! Structured engine errors.
//!
//! One variant per row of the error taxonomy. `thiserror` gives each a
//! `Display` message the CLI renders verbatim, and converts into
//! `anyhow::Error` automatically via `?` inside a function returning
//! `anyhow::Result` — no manual `From` impls needed at the command layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StashError {
    #[error("Stash {0} already initialized")]
    AlreadyInitialized(String),

    #[error("passphrase must be a non-empty string")]
    InvalidPassphrase,

    #[error("The key already exists. Use the modify flag to overwrite")]
    KeyExists,

    #[error("key name must be a non-empty string and may not be the reserved name '{0}'")]
    InvalidKeyName(String),

    #[error("Key {0} not found")]
    KeyNotFound(String),

    #[error("{0} therefore cannot be modified")]
    KeyNotFoundForModify(String),

    #[error("You must provide a value for new keys")]
    MissingValue,

    #[error("Value must be of type dict")]
    InvalidValueType,

    #[error("key-value pair '{0}' is missing a '='")]
    MalformedKeyValue(String),

    #[error("The `force` flag must be provided to perform a stash purge")]
    ForceRequired,

    #[error("There are no keys to export")]
    EmptyExport,

    #[error("You must either provide a path to an exported stash or a list of keys")]
    NoSource,

    #[error("Decryption failed. The passphrase may be incorrect or the data is corrupt")]
    DecryptionFailed,

    #[error("the '{backend}' backend is not available in this build (rebuild with --features {backend})")]
    BackendUnavailable { backend: String },

    #[error("storage backend failure: {0}")]
    BackendFailure(#[from] anyhow::Error),
}

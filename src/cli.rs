//! CLI argument parsing for the stash front-end (component E).
//!
//! Uses clap derive macros for type-safe argument handling.

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};

use crate::error::StashError;

/// ghost-stash — a local, encrypted secret stash.
#[derive(Parser)]
#[command(
    name = "ghost-stash",
    about = "Store and retrieve encrypted key/value secrets",
    version,
    author,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialise a new stash at the configured path.
    InitStash,

    /// Store or modify a key.
    PutKey {
        /// Key name.
        name: String,

        /// `key=value` pairs making up the secret's payload.
        #[arg(value_parser = parse_key_value_pair)]
        pairs: Vec<(String, String)>,

        /// Overwrite an existing key instead of failing.
        #[arg(long)]
        modify: bool,

        /// Human-readable description of the key.
        #[arg(long)]
        description: Option<String>,

        /// `key=value` metadata pairs.
        #[arg(long = "meta", value_parser = parse_key_value_pair)]
        meta: Vec<(String, String)>,
    },

    /// Retrieve a key.
    GetKey {
        /// Key name.
        name: String,

        /// Print as JSON instead of an aligned block.
        #[arg(short = 'j', long)]
        json: bool,
    },

    /// Delete a key.
    DeleteKey {
        /// Key name.
        name: String,
    },

    /// List all key names.
    ListKeys {
        /// Print as a JSON array instead of one name per line.
        #[arg(short = 'j', long)]
        json: bool,
    },

    /// Delete every user key, keeping the passphrase probe.
    PurgeStash {
        /// Required to confirm the destructive operation.
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Export every user key (ciphertext retained) to a JSON file.
    ExportKeys {
        /// Output file path.
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Load previously exported keys back into the stash.
    LoadKeys {
        /// Path to a file produced by `export-keys`.
        path: String,
    },

    /// Generate shell completions.
    Completions {
        shell: String,
    },
}

/// Parse a single `key=value` argument into a pair, used by clap's
/// `value_parser` for repeated `k=v` style flags.
fn parse_key_value_pair(raw: &str) -> Result<(String, String), String> {
    let (k, v) = raw
        .split_once('=')
        .ok_or_else(|| format!("key-value pair '{raw}' is missing a '='"))?;
    Ok((k.to_string(), v.to_string()))
}

/// Turn a list of already-parsed `key=value` pairs into a JSON object
/// mapping, mirroring `_build_dict_from_key_value`'s contract: every
/// entry must contain `=`, enforced upstream by [`parse_key_value_pair`].
pub fn pairs_to_object(pairs: &[(String, String)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (k, v) in pairs {
        map.insert(k.clone(), serde_json::Value::String(v.clone()));
    }
    serde_json::Value::Object(map)
}

/// Turn a list of already-parsed `key=value` pairs into a plain string
/// map, for the `--meta` flag.
pub fn pairs_to_metadata(pairs: &[(String, String)]) -> Option<BTreeMap<String, String>> {
    if pairs.is_empty() {
        return None;
    }
    Some(pairs.iter().cloned().collect())
}

/// Parse raw `key=value` strings from a non-clap source (kept for parity
/// with the engine's documented `MalformedKeyValue` contract when pairs
/// arrive as plain strings rather than pre-validated clap arguments).
pub fn parse_key_value_pairs(raw: &[String]) -> Result<serde_json::Value, StashError> {
    let mut map = serde_json::Map::new();
    for entry in raw {
        let (k, v) = entry
            .split_once('=')
            .ok_or_else(|| StashError::MalformedKeyValue(entry.clone()))?;
        map.insert(k.to_string(), serde_json::Value::String(v.to_string()));
    }
    Ok(serde_json::Value::Object(map))
}

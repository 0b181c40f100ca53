//! `put-key` — store or modify a key.

use anyhow::Result;
use colored::*;

use crate::cli::{pairs_to_metadata, pairs_to_object};
use crate::config::EnvConfig;
use crate::stash::PutRequest;

use super::open_stash;

pub fn run(
    config: &EnvConfig,
    name: String,
    pairs: Vec<(String, String)>,
    modify: bool,
    description: Option<String>,
    meta: Vec<(String, String)>,
) -> Result<()> {
    let stash = open_stash(config)?;

    let value = if pairs.is_empty() { None } else { Some(pairs_to_object(&pairs)) };
    let metadata = pairs_to_metadata(&meta);

    let id = stash.put(
        &name,
        PutRequest {
            value,
            modify,
            description,
            metadata,
        },
    )?;

    println!("{} key '{}' stored (id {})", "✓".green(), name, id);
    Ok(())
}

//! `load-keys` — import previously exported documents (ciphertext kept as-is).

use anyhow::{Context, Result};
use colored::*;
use std::fs;

use crate::config::EnvConfig;
use crate::record::Document;

use super::open_stash;

pub fn run(config: &EnvConfig, path: String) -> Result<()> {
    let stash = open_stash(config)?;

    let content = fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let docs: Vec<Document> = serde_json::from_str(&content).with_context(|| format!("{path} is not a valid export file"))?;

    let count = docs.len();
    stash.load(docs)?;

    println!("{} loaded {} key(s) from {}", "✓".green(), count, path);
    Ok(())
}

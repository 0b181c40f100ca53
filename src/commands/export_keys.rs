//! `export-keys` — dump every user key (ciphertext retained) as JSON.

use anyhow::{Context, Result};
use colored::*;
use std::fs;

use crate::config::EnvConfig;

use super::open_stash;

pub fn run(config: &EnvConfig, output: Option<String>) -> Result<()> {
    let stash = open_stash(config)?;
    let docs = stash.export()?;

    let json = serde_json::to_string_pretty(&docs).context("failed to serialise export")?;

    if let Some(path) = &output {
        fs::write(path, &json).with_context(|| format!("failed to write export file {path}"))?;
        println!("{} exported {} key(s) to {}", "✓".green(), docs.len(), path);
    } else {
        println!("{json}");
    }
    Ok(())
}

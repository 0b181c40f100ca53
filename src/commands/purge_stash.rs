//! `purge-stash` — delete every user key, keeping the passphrase probe.

use anyhow::Result;
use colored::*;

use crate::config::EnvConfig;

use super::open_stash;

pub fn run(config: &EnvConfig, force: bool) -> Result<()> {
    let stash = open_stash(config)?;
    stash.purge(force)?;
    println!("{} stash purged", "✓".green());
    Ok(())
}

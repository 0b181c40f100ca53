//! `delete-key` — remove a single key.

use anyhow::Result;
use colored::*;

use crate::config::EnvConfig;

use super::open_stash;

pub fn run(config: &EnvConfig, name: String) -> Result<()> {
    let stash = open_stash(config)?;
    stash.delete(&name)?;
    println!("{} key '{}' deleted", "✓".green(), name);
    Ok(())
}

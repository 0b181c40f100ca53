//! `get-key` — retrieve a key, pretty-printed or as JSON.

use anyhow::Result;

use crate::config::EnvConfig;
use crate::error::StashError;
use crate::output::{render_json_record, render_pretty_record};

use super::open_stash;

pub fn run(config: &EnvConfig, name: String, json: bool) -> Result<()> {
    let stash = open_stash(config)?;

    let record = stash
        .get(&name, true)?
        .ok_or_else(|| StashError::KeyNotFound(name.clone()))?;

    if json {
        println!("{}", render_json_record(&record));
    } else {
        println!("{}", render_pretty_record(&record));
    }
    Ok(())
}

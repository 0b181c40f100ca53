//! `list-keys` — list all user-visible key names.

use anyhow::Result;

use crate::config::EnvConfig;
use crate::output::{render_json_list, render_pretty_list};

use super::open_stash;

pub fn run(config: &EnvConfig, json: bool) -> Result<()> {
    let stash = open_stash(config)?;
    let names = stash.list()?;

    if json {
        println!("{}", render_json_list(&names));
    } else {
        println!("{}", render_pretty_list(&names));
    }
    Ok(())
}

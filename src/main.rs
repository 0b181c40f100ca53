//! ghost-stash CLI entry point.

use anyhow::Result;
use clap::Parser;

use ghost_stash::cli::{Cli, Commands};
use ghost_stash::commands;
use ghost_stash::config::EnvConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Completions { shell } => commands::completions::run(shell),

        Commands::InitStash => commands::init_stash::run(&EnvConfig::resolve()?),

        Commands::PutKey { name, pairs, modify, description, meta } => {
            commands::put_key::run(&EnvConfig::resolve()?, name, pairs, modify, description, meta)
        }

        Commands::GetKey { name, json } => commands::get_key::run(&EnvConfig::resolve()?, name, json),

        Commands::DeleteKey { name } => commands::delete_key::run(&EnvConfig::resolve()?, name),

        Commands::ListKeys { json } => commands::list_keys::run(&EnvConfig::resolve()?, json),

        Commands::PurgeStash { force } => commands::purge_stash::run(&EnvConfig::resolve()?, force),

        Commands::ExportKeys { output } => commands::export_keys::run(&EnvConfig::resolve()?, output),

        Commands::LoadKeys { path } => commands::load_keys::run(&EnvConfig::resolve()?, path),
    }
}

pub mod delete_key;
pub mod export_keys;
pub mod get_key;
pub mod init_stash;
pub mod list_keys;
pub mod load_keys;
pub mod purge_stash;
pub mod put_key;

use anyhow::{Context, Result};
use std::fs;

use crate::config::EnvConfig;
use crate::stash::Stash;
use crate::storage::open_backend;

/// Every command but `init-stash` opens an already-initialised stash: read
/// the passphrase from `GHOST_PASSPHRASE`, falling back to the
/// `passphrase.ghost` sidecar written at init time.
fn open_stash(config: &EnvConfig) -> Result<Stash> {
    let passphrase = match &config.passphrase {
        Some(p) => p.clone(),
        None => {
            let sidecar = config.passphrase_sidecar_path();
            fs::read_to_string(&sidecar)
                .with_context(|| format!("no passphrase set and no sidecar found at {}", sidecar.display()))?
        }
    };

    let backend = open_backend(config.backend_kind, &config.stash_path, config.remote_kv.clone())?;
    Ok(Stash::open(backend, &passphrase)?)
}

pub mod completions {
    use crate::cli::Cli;
    use anyhow::Result;
    use clap::CommandFactory;
    use clap_complete::{generate, Shell};
    use std::io;

    pub fn run(shell: String) -> Result<()> {
        let shell = match shell.to_lowercase().as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            _ => {
                eprintln!("Unsupported shell: {}", shell);
                std::process::exit(1);
            }
        };

        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "ghost-stash", &mut io::stdout());
        Ok(())
    }
}

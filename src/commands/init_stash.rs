//! `init-stash` — initialise a new stash and write the passphrase sidecar.

use anyhow::{Context, Result};
use colored::*;
use std::fs;

use crate::config::EnvConfig;
use crate::storage::open_backend;
use crate::stash::Stash;
use crate::utils::fs::set_secure_permissions;

pub fn run(config: &EnvConfig) -> Result<()> {
    let backend = open_backend(config.backend_kind, &config.stash_path, config.remote_kv.clone())?;
    let effective_passphrase = Stash::init(backend, config.passphrase.clone())?;

    let sidecar = config.passphrase_sidecar_path();
    fs::write(&sidecar, &effective_passphrase)
        .with_context(|| format!("failed to write passphrase sidecar {}", sidecar.display()))?;
    set_secure_permissions(&sidecar)
        .with_context(|| format!("failed to secure passphrase sidecar {}", sidecar.display()))?;

    println!("{} stash initialised at {}", "✓".green(), config.stash_path);
    println!("  passphrase written to {}", sidecar.display());
    Ok(())
}

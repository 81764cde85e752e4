//! Write a settings file template

use anyhow::{Context, Result};
use mirrorwatch_core::config::config_template;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    std::fs::write(path, config_template())
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("{} {}", "wrote:".bold(), path.display());
    println!("edit it, then run {} to start mirroring", "mw watch".cyan());
    Ok(())
}

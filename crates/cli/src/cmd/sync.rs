//! One-shot sync to completion

use anyhow::{Context, Result};
use mirrorwatch_core::args::build_rsync_args;
use mirrorwatch_core::{Config, RequestMode, RsyncRunner, SyncScheduler};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    println!(
        "{} {} -> {}@{}:{}",
        "syncing:".bold(),
        config.local_path.display(),
        config.remote_user,
        config.remote_host,
        config.remote_path
    );

    let runner = Arc::new(RsyncRunner::new(
        config.rsync_path.clone(),
        build_rsync_args(&config),
    ));
    let scheduler = SyncScheduler::new(runner);

    // The whole transfer runs before this returns
    scheduler.request(RequestMode::Wait);
    Ok(())
}

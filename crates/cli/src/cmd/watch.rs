//! Watch the local tree and keep the remote mirror current

use anyhow::{Context, Result};
use mirrorwatch_core::args::build_rsync_args;
use mirrorwatch_core::{Config, RequestMode, RsyncRunner, SyncScheduler};
use mirrorwatch_watcher::{ChangeWatcher, EventFilter, IntervalTicker};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let runner = Arc::new(RsyncRunner::new(
        config.rsync_path.clone(),
        build_rsync_args(&config),
    ));
    let scheduler = Arc::new(SyncScheduler::new(runner));

    println!(
        "{} {}",
        "watching:".bold(),
        config.local_path.display()
    );
    println!(
        "{} {}@{}:{}",
        "mirror to:".bold(),
        config.remote_user,
        config.remote_host,
        config.remote_path
    );

    // Periodic trigger; spawn returns None when interval_secs is 0
    let _ticker = {
        let scheduler = scheduler.clone();
        let verbose = config.verbose_notifications;
        IntervalTicker::spawn(Duration::from_secs(config.interval_secs), move || {
            if verbose {
                info!("sync triggered by interval");
            }
            scheduler.request(RequestMode::FireAndForget);
        })?
    };

    // Change-notification trigger
    let filter = EventFilter::new(&config.local_path, &config.excludes, &config.includes)
        .context("invalid exclude patterns")?;
    let watcher = ChangeWatcher::start(&config.local_path, filter)
        .with_context(|| format!("failed to watch {}", config.local_path.display()))?;

    // Dispatch on a dedicated thread: a request blocks for the whole
    // duration of a transfer run, which must not stall signal handling
    let _dispatcher = {
        let scheduler = scheduler.clone();
        let events = watcher.events().clone();
        let verbose = config.verbose_notifications;
        std::thread::spawn(move || {
            for event in events.iter() {
                if verbose {
                    info!("sync triggered by {event}");
                }
                scheduler.request(RequestMode::FireAndForget);
            }
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    // An in-flight transfer is not drained on shutdown; exit without
    // joining the trigger threads
    info!("shutting down");
    std::process::exit(0);
}

//! Mirrorwatch CLI - mw command

use anyhow::Result;
use clap::{Parser, Subcommand};
use mirrorwatch_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

mod cmd;

/// Mirrorwatch - mirror a directory to a remote host as it changes
#[derive(Parser)]
#[command(name = "mw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the local tree and sync on changes or on a timer
    Watch {
        /// Path to the settings file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Run one sync to completion and exit
    Sync {
        /// Path to the settings file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Write a settings file template
    Init {
        /// Where to write the template
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { config } => cmd::watch::run(&config).await,
        Commands::Sync { config } => cmd::sync::run(&config).await,
        Commands::Init { path, force } => cmd::init::run(&path, force),
    }
}

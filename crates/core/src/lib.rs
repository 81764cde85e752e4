//! Core scheduling and transfer logic for mirrorwatch
//!
//! This crate owns the pieces that do not touch the filesystem watcher:
//! - `config`: the `mirrorwatch.toml` settings file
//! - `args`: building the rsync command line from settings
//! - `invoker`: running one rsync process to completion
//! - `scheduler`: coalescing concurrent sync triggers into serialized runs

pub mod args;
pub mod config;
pub mod invoker;
pub mod scheduler;

pub use config::Config;
pub use invoker::{RsyncRunner, TransferOutcome, TransferRunner};
pub use scheduler::{RequestMode, SyncScheduler};

//! Single-run rsync invocation
//!
//! One `run()` call spawns one rsync process and blocks until it exits.
//! Every failure mode is absorbed into a [`TransferOutcome`]; nothing here
//! ever propagates an error to the scheduler, which only needs to know that
//! the run is over.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Result of one transfer run, consumed only for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// rsync exited with status 0
    Success,
    /// rsync exited non-zero or was killed by a signal
    Failed { code: Option<i32> },
    /// The process could not be started at all
    LaunchFailed { error: String },
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }
}

/// One synchronous transfer run
///
/// The seam between the scheduler and the outside world; tests substitute
/// their own runner to observe scheduling behavior without spawning rsync.
pub trait TransferRunner: Send + Sync {
    fn run(&self) -> TransferOutcome;
}

/// Runs the configured rsync binary with a pre-built argument vector
pub struct RsyncRunner {
    binary: PathBuf,
    args: Vec<String>,
}

impl RsyncRunner {
    pub fn new(binary: PathBuf, args: Vec<String>) -> Self {
        Self { binary, args }
    }
}

impl TransferRunner for RsyncRunner {
    fn run(&self) -> TransferOutcome {
        debug!("spawning {} {}", self.binary.display(), self.args.join(" "));

        let mut command = Command::new(&self.binary);
        command.args(&self.args).stdin(Stdio::null());

        // rsync output goes to our own stdout/stderr; no console window
        // should pop up when running detached on Windows
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("failed to launch {}: {}", self.binary.display(), e);
                return TransferOutcome::LaunchFailed {
                    error: e.to_string(),
                };
            }
        };

        match child.wait() {
            Ok(status) if status.success() => TransferOutcome::Success,
            Ok(status) => TransferOutcome::Failed {
                code: status.code(),
            },
            Err(e) => {
                warn!("failed to wait for {}: {}", self.binary.display(), e);
                TransferOutcome::LaunchFailed {
                    error: e.to_string(),
                }
            }
        }
    }
}

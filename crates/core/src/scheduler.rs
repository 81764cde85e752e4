//! Sync trigger coalescing
//!
//! Change notifications and timer ticks arrive from independent threads, each
//! asking for "a transfer soon". This module serializes them: at most one
//! rsync run at a time, and any trigger that lands while a run is in flight is
//! folded into exactly one follow-up run after the current one completes, so
//! no change is ever silently dropped.

use crate::invoker::{TransferOutcome, TransferRunner};
use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{info, warn};

/// How a caller wants its trigger handled when a run is already in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Return immediately; the follow-up run covers this trigger
    FireAndForget,
    /// Block until the in-flight run (and its follow-up) has completed
    Wait,
}

#[derive(Default)]
struct State {
    /// A transfer run is executing right now
    running: bool,
    /// A trigger arrived while running; owed one follow-up run
    pending: bool,
}

/// Serialization point between trigger sources and the transfer runner
///
/// All trigger sources share one scheduler via `Arc`. The runner executes on
/// whichever caller thread won the idle slot; everyone else either returns
/// immediately or parks on the condvar, never on the state lock.
pub struct SyncScheduler {
    state: Mutex<State>,
    done: Condvar,
    runner: Arc<dyn TransferRunner>,
}

impl SyncScheduler {
    pub fn new(runner: Arc<dyn TransferRunner>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            done: Condvar::new(),
            runner,
        }
    }

    /// Request a transfer
    ///
    /// If no run is in flight, the run happens synchronously on this thread
    /// before the call returns. Otherwise the request is recorded as pending;
    /// [`RequestMode::Wait`] additionally blocks until the flag clears.
    ///
    /// Run outcomes are logged and absorbed here; no failure ever reaches a
    /// caller.
    pub fn request(&self, mode: RequestMode) {
        let mut state = self.state.lock();

        if state.running {
            state.pending = true;
            if mode == RequestMode::Wait {
                while state.running {
                    self.done.wait(&mut state);
                }
            }
            return;
        }

        state.running = true;
        drop(state);

        loop {
            let outcome = catch_unwind(AssertUnwindSafe(|| self.runner.run()))
                .unwrap_or_else(|_| TransferOutcome::LaunchFailed {
                    error: "transfer runner panicked".to_string(),
                });
            log_outcome(&outcome);

            let mut state = self.state.lock();
            if state.pending {
                // Triggers were coalesced while we ran; drain them with one
                // more run, keeping the in-flight flag held throughout
                state.pending = false;
                drop(state);
                continue;
            }

            state.running = false;
            self.done.notify_all();
            return;
        }
    }

    /// Whether a transfer run is executing right now
    pub fn in_flight(&self) -> bool {
        self.state.lock().running
    }
}

fn log_outcome(outcome: &TransferOutcome) {
    match outcome {
        TransferOutcome::Success => info!("sync completed"),
        TransferOutcome::Failed { code: Some(code) } => {
            warn!("sync failed with exit code {code}")
        }
        TransferOutcome::Failed { code: None } => warn!("sync killed by signal"),
        TransferOutcome::LaunchFailed { error } => warn!("sync could not start: {error}"),
    }
}

//! Periodic sync trigger
//!
//! Fires a callback at a fixed period for as long as the handle is alive, so
//! the mirror converges even when no filesystem event arrives (changes missed
//! by the watcher, clock-driven content, remote-side drift). A period of zero
//! disables the ticker entirely.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

/// Fixed-period trigger source
pub struct IntervalTicker;

impl IntervalTicker {
    /// Spawn the ticker thread
    ///
    /// Returns `None` when `period` is zero (periodic sync disabled). The
    /// callback runs on the ticker's own thread and may block; the next tick
    /// fires one full period after the callback returns.
    pub fn spawn<F>(period: Duration, on_tick: F) -> Result<Option<TickerHandle>>
    where
        F: Fn() + Send + 'static,
    {
        if period.is_zero() {
            info!("periodic sync disabled");
            return Ok(None);
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let thread = std::thread::Builder::new()
            .name("interval-ticker".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        debug!("interval tick");
                        on_tick();
                    }
                    // Stop requested, or the handle was dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .context("failed to spawn ticker thread")?;

        info!("periodic sync every {period:?}");
        Ok(Some(TickerHandle {
            stop_tx,
            thread: Some(thread),
        }))
    }
}

/// Owner of a running ticker; stopping or dropping it ends the thread
pub struct TickerHandle {
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stop the ticker and wait for its thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use super::engine::{PassReport, SyncEngine};

/// At most one synchronization pass at a time.
///
/// `try_acquire` never blocks: a caller that finds the gate taken drops its
/// trigger instead of queueing behind the running pass.
#[derive(Clone, Default)]
pub struct PassGate {
    busy: Arc<AtomicBool>,
}

impl PassGate {
    pub fn try_acquire(&self) -> Option<PassGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped, including on unwind.
pub struct PassGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub enum TriggerOutcome {
    Completed(PassReport),
    /// The pass was handed to a background thread and is still running.
    Started,
    /// Another pass held the gate; nothing was done.
    Skipped,
}

/// Runs `SyncEngine` passes, on demand or periodically, one at a time.
#[derive(Clone)]
pub struct Scheduler {
    engine: Arc<SyncEngine>,
    gate: PassGate,
}

impl Scheduler {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            gate: PassGate::default(),
        }
    }

    pub fn gate(&self) -> &PassGate {
        &self.gate
    }

    /// Run a pass on the calling thread unless one is already in flight.
    pub fn trigger(&self) -> TriggerOutcome {
        self.trigger_until(&AtomicBool::new(false))
    }

    fn trigger_until(&self, cancel: &AtomicBool) -> TriggerOutcome {
        let Some(_guard) = self.gate.try_acquire() else {
            debug!("synchronization pass already running, trigger dropped");
            return TriggerOutcome::Skipped;
        };
        TriggerOutcome::Completed(self.engine.run_pass_until(cancel))
    }

    /// Start a pass on its own thread and return without waiting for it.
    ///
    /// The gate is taken before the thread is spawned, so a second call made
    /// while the first pass runs reports `Skipped`.
    pub fn trigger_detached(&self) -> io::Result<TriggerOutcome> {
        let Some(guard) = self.gate.try_acquire() else {
            debug!("synchronization pass already running, trigger dropped");
            return Ok(TriggerOutcome::Skipped);
        };
        let engine = Arc::clone(&self.engine);
        thread::Builder::new()
            .name("library-rescan".into())
            .spawn(move || {
                let _guard = guard;
                engine.run_pass();
            })?;
        Ok(TriggerOutcome::Started)
    }

    /// Spawn the background thread: one pass now (if `on_startup`), then one
    /// every `interval` until the returned handle is stopped or dropped.
    ///
    /// Stopping the handle cancels only the passes this thread runs; other
    /// clones of the scheduler keep working.
    pub fn start(&self, interval: Duration, on_startup: bool) -> io::Result<SchedulerHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let cancel = Arc::new(AtomicBool::new(false));
        let scheduler = self.clone();
        let thread_cancel = Arc::clone(&cancel);

        let join = thread::Builder::new()
            .name("library-sync".into())
            .spawn(move || {
                info!(interval_secs = interval.as_secs(), "library sync scheduler started");
                if on_startup {
                    scheduler.trigger_until(&thread_cancel);
                }
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            scheduler.trigger_until(&thread_cancel);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("library sync scheduler stopped");
            })?;

        Ok(SchedulerHandle {
            stop_tx: Some(stop_tx),
            cancel,
            join: Some(join),
        })
    }
}

/// Owner of the background scheduler thread.
pub struct SchedulerHandle {
    stop_tx: Option<Sender<()>>,
    cancel: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Cancel any running pass, stop the timer and wait for the thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Library synchronization: a single reconciliation pass (`SyncEngine`) and
//! the scheduler that runs passes periodically, never two at once.

mod engine;
mod scheduler;

pub use engine::{PassReport, SyncEngine};
pub use scheduler::{PassGate, PassGuard, Scheduler, SchedulerHandle, TriggerOutcome};

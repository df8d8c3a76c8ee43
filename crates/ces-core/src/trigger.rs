//! Periodic refresh trigger.
//!
//! Owns at most one scheduled refresh task. Scheduling is idempotent, the first
//! pass runs right away and then once per interval. [`PeriodicTrigger::unschedule`]
//! is the teardown hook: it cancels the task this trigger registered. Dropping
//! the trigger cancels it too.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::refresh::Refresher;

pub struct PeriodicTrigger {
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicTrigger {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            task: Mutex::new(None),
        }
    }

    pub fn daily() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Schedule periodic refreshes unless already scheduled. Returns true if a
    /// new task was registered. Must be called from within a tokio runtime.
    pub fn ensure_scheduled(&self, refresher: Arc<Refresher>) -> bool {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }
        let interval = self.interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let refresher = Arc::clone(&refresher);
                match tokio::task::spawn_blocking(move || refresher.refresh_all()).await {
                    Ok(report) => tracing::debug!(
                        written = report.written(),
                        failed = report.failed(),
                        "scheduled refresh done"
                    ),
                    Err(e) => tracing::warn!("scheduled refresh task failed: {}", e),
                }
            }
        }));
        tracing::info!(interval_secs = interval.as_secs(), "refresh scheduled");
        true
    }

    pub fn is_scheduled(&self) -> bool {
        self.slot().as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the scheduled task, if any. Returns true if one was cancelled.
    /// A refresh pass already running on the blocking pool finishes on its own;
    /// the store's atomic writes keep that safe.
    pub fn unschedule(&self) -> bool {
        match self.slot().take() {
            Some(handle) => {
                handle.abort();
                tracing::info!("refresh unscheduled");
                true
            }
            None => false,
        }
    }
}

impl Drop for PeriodicTrigger {
    fn drop(&mut self) {
        if let Some(handle) = self.slot().take() {
            handle.abort();
        }
    }
}

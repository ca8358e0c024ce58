use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::foundation::error::{MemeError, MemeResult};

/// Trailing-edge debounce for viewport changes.
///
/// Each [`schedule`](Self::schedule) cancels the pending timer and arms a new one, so a burst of
/// signals fires `trigger` once, `quiet` after the last signal. Dropping the scheduler cancels
/// any pending fire.
///
/// `trigger` receives the generation of the signal that armed it. A fire can race with a newer
/// signal when it is delivered through a queue, so receivers check it with
/// [`is_current`](Self::is_current) before acting.
pub struct ResizeScheduler {
    quiet: Duration,
    trigger: Arc<dyn Fn(u64) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl ResizeScheduler {
    /// Scheduler that calls `trigger` after `quiet` without further signals.
    pub fn new(quiet: Duration, trigger: impl Fn(u64) + Send + Sync + 'static) -> Self {
        Self {
            quiet,
            trigger: Arc::new(trigger),
            pending: None,
            generation: 0,
        }
    }

    /// Quiet window.
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Register a change signal, restarting the quiet window.
    ///
    /// Must be called from within a Tokio runtime. Returns the generation the fire will carry.
    pub fn schedule(&mut self) -> MemeResult<u64> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| MemeError::validation(format!("resize scheduling needs a runtime: {e}")))?;
        self.cancel();

        let generation = self.generation;
        let deadline = tokio::time::Instant::now() + self.quiet;
        let trigger = Arc::clone(&self.trigger);
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            trigger(generation);
        }));
        Ok(generation)
    }

    /// Drop the pending fire, if any. Fires already delivered become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// `true` if a fire carrying `generation` belongs to the latest signal and was not cancelled.
    pub fn is_current(&self, generation: u64) -> bool {
        self.pending.is_some() && generation == self.generation
    }

    /// `true` while a fire is armed and has not happened yet.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ResizeScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/scheduler.rs"]
mod tests;

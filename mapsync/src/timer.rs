//! Cancellable repeating task driven by the host clock.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

/// A task due every `interval_ms`, polled by the host.
///
/// The task is due at its start time, so the first [`RepeatingTask::poll`]
/// fires immediately. After each fire the next deadline is `now + interval`;
/// missed intervals are not replayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatingTask {
    interval_ms: f64,
    next_due_ms: f64,
    cancelled: bool,
}

impl RepeatingTask {
    #[must_use]
    pub fn start(interval_ms: f64, now_ms: f64) -> Self {
        Self { interval_ms, next_due_ms: now_ms, cancelled: false }
    }

    /// Returns `true` if the task should run at `now_ms`, and schedules the
    /// next run.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if self.cancelled || now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms = now_ms + self.interval_ms;
        true
    }

    /// Stop the task permanently.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Host time of the next run, or `None` once cancelled.
    #[must_use]
    pub fn next_due_ms(&self) -> Option<f64> {
        (!self.cancelled).then_some(self.next_due_ms)
    }
}

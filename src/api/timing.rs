use std::time::{Duration, Instant};

/// Logs how long a scope took when it is dropped.
pub struct TimedScope {
    label: String,
    started: Instant,
}

impl TimedScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for TimedScope {
    fn drop(&mut self) {
        tracing::debug!(
            "{} took {:.2} ms",
            self.label,
            self.elapsed().as_secs_f64() * 1000.0
        );
    }
}

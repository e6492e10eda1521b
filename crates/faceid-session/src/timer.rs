//! Session-scoped deadline.

use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Instant, Sleep};

/// Bounds one verification attempt.
///
/// Owned by the session; `cancel` consumes the timer, so once cancelled it
/// cannot be polled again and a late expiry is impossible.
pub struct SessionTimer {
    sleep: Pin<Box<Sleep>>,
    duration: Duration,
    started: Instant,
}

impl SessionTimer {
    pub fn start(duration: Duration) -> Self {
        let started = Instant::now();
        Self {
            sleep: Box::pin(tokio::time::sleep_until(started + duration)),
            duration,
            started,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Resolves once the deadline passes. Cancel-safe.
    pub async fn expired(&mut self) {
        self.sleep.as_mut().await;
    }

    pub fn cancel(self) {
        tracing::debug!(elapsed_ms = self.elapsed().as_millis() as u64, "session timer cancelled");
    }
}

//! Bounded, cancellable polling.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// `attempts` re-checks spaced `interval` apart, after an initial check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    /// Five retries 200 ms apart: about one second of waiting in total.
    fn default() -> Self {
        Self {
            attempts: 5,
            interval: Duration::from_millis(200),
        }
    }
}

impl PollPolicy {
    /// Longest time [`poll`](Self::poll) can wait.
    pub fn budget(&self) -> Duration {
        self.interval * self.attempts
    }

    /// Call `check` until it yields a value, the attempts run out, or `cancel` fires.
    pub async fn poll<T, F>(&self, cancel: &CancellationToken, mut check: F) -> Option<T>
    where
        F: FnMut() -> Option<T>,
    {
        if let Some(found) = check() {
            return Some(found);
        }

        for _ in 0..self.attempts {
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.interval) => {}
            }
            if let Some(found) = check() {
                return Some(found);
            }
        }

        None
    }
}

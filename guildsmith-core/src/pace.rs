//! Fixed pacing between mutating platform calls.

use std::time::Duration;

/// Default pause after each successful creation call.
pub const DEFAULT_CREATE_DELAY: Duration = Duration::from_millis(500);

/// Fixed inter-operation delay. Not a token bucket — just a pause that
/// keeps a sequential run under the platform's call-rate limits.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Suspend the current task for the configured delay.
    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        tokio::time::sleep(self.delay).await;
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_CREATE_DELAY)
    }
}

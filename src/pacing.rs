use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Enforces a minimum interval between consecutive dispatches.
///
/// The first dispatch is immediate; every later one waits until `interval`
/// has passed since the previous dispatch started.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_dispatch: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_dispatch: None,
        }
    }

    /// Waits for the next slot and marks it as taken.
    pub async fn ready(&mut self) {
        if let Some(last) = self.last_dispatch {
            sleep_until(last + self.interval).await;
        }
        self.last_dispatch = Some(Instant::now());
    }
}

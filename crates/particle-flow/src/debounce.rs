//! Collapse bursts of values into the last one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Waits for input to go quiet for `delay`, then yields the latest value.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Next settled value from `rx`.
    ///
    /// Blocks for the first value, then keeps replacing it while new values
    /// arrive within `delay` of the previous one. If the channel closes
    /// mid-burst the pending value is still returned. `None` once the channel
    /// is closed and drained.
    pub async fn next<T>(&self, rx: &mut mpsc::Receiver<T>) -> Option<T> {
        let mut latest = rx.recv().await?;
        let mut deadline = Instant::now() + self.delay;

        loop {
            tokio::select! {
                biased;
                next = rx.recv() => match next {
                    Some(value) => {
                        latest = value;
                        deadline = Instant::now() + self.delay;
                    }
                    None => return Some(latest),
                },
                _ = sleep_until(deadline) => return Some(latest),
            }
        }
    }
}

//! Single-deadline reconnect timer

use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use tokio::time::Instant;
use tracing::debug;

/// Holds at most one outstanding reconnect deadline.
///
/// The delay is fixed: every attempt waits the same interval, with no growth,
/// no jitter and no attempt limit.
pub struct ReconnectTimer {
    policy: Constant,
    delay: Duration,
    deadline: Option<Instant>,
}

impl ReconnectTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            policy: Constant::new(delay),
            delay,
            deadline: None,
        }
    }

    /// Arm the timer. Returns `false` and leaves the existing deadline alone
    /// when one is already pending.
    pub fn schedule(&mut self) -> bool {
        if self.deadline.is_some() {
            debug!("Reconnect already scheduled");
            return false;
        }

        let delay = self.policy.next_backoff().unwrap_or(self.delay);
        self.deadline = Some(Instant::now() + delay);
        debug!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
        true
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            debug!("Reconnect timer cancelled");
        }
        self.policy.reset();
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolve when the pending deadline passes, then disarm.
    /// Never resolves while nothing is scheduled.
    ///
    /// Cancel safe: dropping the future keeps the deadline armed.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

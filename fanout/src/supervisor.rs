use std::time::Duration;

use log::warn;

use crate::config::FanConfig;
use crate::latch::CompletionLatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    TimedOut,
}

impl WaitOutcome {
    pub fn is_completed(self) -> bool {
        self == WaitOutcome::Completed
    }
}

/// Races a latch release against `deadline`.
///
/// Losing the race only stops the wait: the tasks behind the latch keep
/// running in the background.
pub async fn wait_with_timeout(latch: &CompletionLatch, deadline: Duration) -> WaitOutcome {
    match tokio::time::timeout(deadline, latch.wait()).await {
        Ok(()) => WaitOutcome::Completed,
        Err(_) => {
            warn!(
                "{} of {} tasks still running after {:?}, possible stall",
                latch.remaining(),
                latch.total(),
                deadline
            );
            WaitOutcome::TimedOut
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundedWaitSupervisor {
    deadline: Duration,
}

impl BoundedWaitSupervisor {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn from_config(config: &FanConfig) -> Self {
        Self::new(config.stall_deadline())
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn watch(&self, latch: &CompletionLatch) -> WaitOutcome {
        wait_with_timeout(latch, self.deadline).await
    }
}

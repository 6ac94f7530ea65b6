use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug)]
struct LatchState {
    total: usize,
    remaining: AtomicUsize,
    notify: Notify,
}

/// One-way countdown over `total` outstanding tasks.
///
/// Clones share the same count. Every task calls [`done`](Self::done) exactly
/// once; any number of waiters are released when the count reaches zero.
#[derive(Debug, Clone)]
pub struct CompletionLatch {
    state: Arc<LatchState>,
}

impl CompletionLatch {
    pub fn new(total: usize) -> Self {
        Self {
            state: Arc::new(LatchState {
                total,
                remaining: AtomicUsize::new(total),
                notify: Notify::new(),
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.state.total
    }

    pub fn remaining(&self) -> usize {
        self.state.remaining.load(Ordering::Acquire)
    }

    pub fn is_released(&self) -> bool {
        self.remaining() == 0
    }

    /// Marks one task as finished.
    ///
    /// # Panics
    ///
    /// Panics when called more times than the latch total.
    pub fn done(&self) {
        let previous = self
            .state
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                remaining.checked_sub(1)
            })
            .unwrap_or_else(|_| {
                panic!(
                    "CompletionLatch::done called more than {} times",
                    self.state.total
                )
            });

        if previous == 1 {
            self.state.notify.notify_waiters();
        }
    }

    /// Suspends until every task has called `done`.
    pub async fn wait(&self) {
        loop {
            // Registered before the check so a release between the load and
            // the await is not lost.
            let mut notified = pin!(self.state.notify.notified());
            notified.as_mut().enable();

            if self.is_released() {
                return;
            }
            notified.await;
        }
    }
}

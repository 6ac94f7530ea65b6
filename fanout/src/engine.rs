use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::aggregator;
use crate::channel::{result_channel, ResultReceiver};
use crate::closer::ChannelCloser;
use crate::config::FanConfig;
use crate::latch::CompletionLatch;

#[derive(Debug, thiserror::Error)]
#[error("{remaining} of {total} tasks unfinished after {deadline:?}")]
pub struct Stalled {
    pub remaining: usize,
    pub total: usize,
    pub deadline: Duration,
}

/// Spawns one tokio task per input item and funnels their results into a
/// single result channel.
#[derive(Debug, Clone, Copy)]
pub struct FanOutEngine {
    capacity: Option<usize>,
}

impl Default for FanOutEngine {
    fn default() -> Self {
        Self::from_config(&FanConfig::default())
    }
}

impl FanOutEngine {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { capacity }
    }

    pub fn from_config(config: &FanConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Runs `work` on every item, each on its own task.
    pub fn run<I, T, R, F>(&self, items: I, work: F) -> FanOut<R>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        self.run_async(items, move |item| {
            let work = Arc::clone(&work);
            async move { work(item) }
        })
    }

    /// Like [`run`](Self::run), for work that suspends.
    ///
    /// `work` is called on the caller's thread to build each future; the
    /// futures themselves run on spawned tasks.
    pub fn run_async<I, T, R, F, Fut>(&self, items: I, work: F) -> FanOut<R>
    where
        I: IntoIterator<Item = T>,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        let items: Vec<T> = items.into_iter().collect();
        let latch = CompletionLatch::new(items.len());
        let (close, receiver) = result_channel(self.capacity);

        for item in items {
            let tx = close.sender();
            let latch = latch.clone();
            let task = work(item);
            tokio::spawn(async move {
                let result = task.await;
                if !tx.send(result).await {
                    debug!("result receiver dropped, discarding result");
                }
                drop(tx);
                latch.done();
            });
        }
        debug!("spawned {} fan-out tasks", latch.total());

        let closer = ChannelCloser::new(close, latch.clone()).spawn();

        FanOut {
            receiver,
            latch,
            closer,
        }
    }
}

/// A running fan-out: the receiving end plus the latch its tasks count down.
#[derive(Debug)]
pub struct FanOut<R> {
    receiver: ResultReceiver<R>,
    latch: CompletionLatch,
    closer: JoinHandle<()>,
}

impl<R> FanOut<R>
where
    R: Send + 'static,
{
    /// Latch the tasks count down.
    ///
    /// On a bounded channel producers wait for the consumer, so watching this
    /// latch without draining can time out. [`drain_within`](Self::drain_within)
    /// supervises while draining.
    pub fn latch(&self) -> &CompletionLatch {
        &self.latch
    }

    pub fn receiver_mut(&mut self) -> &mut ResultReceiver<R> {
        &mut self.receiver
    }

    /// Folds every result once all tasks are done.
    pub async fn drain<Acc, F>(mut self, initial: Acc, fold: F) -> Acc
    where
        F: FnMut(Acc, R) -> Acc,
    {
        let acc = aggregator::drain(&mut self.receiver, initial, fold).await;
        if let Err(e) = self.closer.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
        acc
    }

    pub async fn collect(self) -> Vec<R> {
        self.drain(Vec::new(), aggregator::push).await
    }

    /// Drains like [`drain`](Self::drain), giving up after `deadline`.
    ///
    /// Tasks that have not finished keep running after a timeout.
    pub async fn drain_within<Acc, F>(
        self,
        deadline: Duration,
        initial: Acc,
        fold: F,
    ) -> Result<Acc, Stalled>
    where
        F: FnMut(Acc, R) -> Acc,
    {
        let latch = self.latch.clone();
        tokio::time::timeout(deadline, self.drain(initial, fold))
            .await
            .map_err(|_| Stalled {
                remaining: latch.remaining(),
                total: latch.total(),
                deadline,
            })
    }
}

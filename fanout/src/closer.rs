use log::debug;
use tokio::task::JoinHandle;

use crate::channel::CloseHandle;
use crate::latch::CompletionLatch;

/// The single actor allowed to close a result channel.
#[derive(Debug)]
pub struct ChannelCloser<T> {
    handle: CloseHandle<T>,
    latch: CompletionLatch,
}

impl<T> ChannelCloser<T>
where
    T: Send + 'static,
{
    pub fn new(handle: CloseHandle<T>, latch: CompletionLatch) -> Self {
        Self { handle, latch }
    }

    /// Waits for the latch to release, then closes the channel.
    pub async fn run(self) {
        self.latch.wait().await;
        debug!(
            "all {} producers finished, closing result channel",
            self.latch.total()
        );
        self.handle.close();
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

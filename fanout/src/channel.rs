use std::pin::pin;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

#[derive(Debug)]
enum Tx<T> {
    Bounded(Sender<T>),
    Unbounded(UnboundedSender<T>),
}

impl<T> Clone for Tx<T> {
    fn clone(&self) -> Self {
        match self {
            Tx::Bounded(tx) => Tx::Bounded(tx.clone()),
            Tx::Unbounded(tx) => Tx::Unbounded(tx.clone()),
        }
    }
}

#[derive(Debug)]
enum Rx<T> {
    Bounded(Receiver<T>),
    Unbounded(UnboundedReceiver<T>),
}

impl<T> Rx<T> {
    async fn recv(&mut self) -> Option<T> {
        match self {
            Rx::Bounded(rx) => rx.recv().await,
            Rx::Unbounded(rx) => rx.recv().await,
        }
    }

    fn close(&mut self) {
        match self {
            Rx::Bounded(rx) => rx.close(),
            Rx::Unbounded(rx) => rx.close(),
        }
    }
}

/// Open/closed flag shared by every handle of one channel.
///
/// Senders check the flag and enqueue under the read lock, so once `close`
/// holds the write lock no result can slip in behind it.
#[derive(Debug, Default)]
struct ChannelState {
    closed: RwLock<bool>,
    notify: Notify,
}

/// Creates a result channel.
///
/// `None` makes it unbounded, `Some(n)` holds at most `n` undelivered
/// results and suspends producers when full.
///
/// # Panics
///
/// Panics if the capacity is `Some(0)`.
pub fn result_channel<T>(capacity: Option<usize>) -> (CloseHandle<T>, ResultReceiver<T>) {
    let (tx, rx) = match capacity {
        Some(capacity) => {
            assert!(capacity > 0, "result channel capacity must be > 0");
            let (tx, rx) = mpsc::channel(capacity);
            (Tx::Bounded(tx), Rx::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (Tx::Unbounded(tx), Rx::Unbounded(rx))
        }
    };
    let state = Arc::new(ChannelState::default());

    (
        CloseHandle {
            tx,
            state: Arc::clone(&state),
        },
        ResultReceiver { rx, state },
    )
}

/// Producer side handed to a single task.
#[derive(Debug)]
pub struct ResultSender<T> {
    tx: Tx<T>,
    state: Arc<ChannelState>,
}

impl<T> Clone for ResultSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> ResultSender<T> {
    /// Enqueues a result, waiting for room on a bounded channel.
    ///
    /// Returns `false` and discards the value if the channel is closed or
    /// the receiver is gone.
    pub async fn send(&self, value: T) -> bool {
        match &self.tx {
            Tx::Bounded(tx) => {
                let Ok(permit) = tx.reserve().await else {
                    return false;
                };
                let closed = self.state.closed.read();
                if *closed {
                    return false;
                }
                permit.send(value);
                true
            }
            Tx::Unbounded(tx) => {
                let closed = self.state.closed.read();
                !*closed && tx.send(value).is_ok()
            }
        }
    }
}

/// The originating sender. Owning it is the only way to close the channel.
///
/// Not `Clone`: `close` consumes the one handle, so the channel cannot be
/// closed twice.
#[derive(Debug)]
pub struct CloseHandle<T> {
    tx: Tx<T>,
    state: Arc<ChannelState>,
}

impl<T> CloseHandle<T> {
    pub fn sender(&self) -> ResultSender<T> {
        ResultSender {
            tx: self.tx.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Transitions the channel from open to closed.
    ///
    /// Later sends are refused. The receiver hands out what was already
    /// buffered, then reports end-of-stream, even if some `ResultSender`
    /// is still alive.
    pub fn close(self) {
        *self.state.closed.write() = true;
        self.state.notify.notify_waiters();
        drop(self.tx);
    }
}

/// Single consumer side of a result channel.
#[derive(Debug)]
pub struct ResultReceiver<T> {
    rx: Rx<T>,
    state: Arc<ChannelState>,
}

impl<T> ResultReceiver<T> {
    /// Next result in arrival order, or `None` once closed and empty.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            let mut closing = pin!(self.state.notify.notified());
            closing.as_mut().enable();

            if self.is_closed() {
                self.rx.close();
                return self.rx.recv().await;
            }

            tokio::select! {
                value = self.rx.recv() => return value,
                _ = closing => {}
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.state.closed.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn drains_buffered_results_after_close() {
        let (close, mut rx) = result_channel::<i32>(Some(2));
        let tx = close.sender();
        assert!(tx.send(1).await);
        assert!(tx.send(2).await);
        drop(tx);

        assert!(!rx.is_closed());
        close.close();
        assert!(rx.is_closed());

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn bounded_send_suspends_when_full() {
        let (close, mut rx) = result_channel::<i32>(Some(1));
        let tx = close.sender();
        assert!(tx.send(1).await);

        let blocked = timeout(Duration::from_millis(50), tx.send(2)).await;
        assert!(blocked.is_err(), "second send should wait for room");

        assert_eq!(rx.recv().await, Some(1));
        assert!(tx.send(3).await);
        assert_eq!(rx.recv().await, Some(3));
    }

    #[tokio::test]
    async fn unbounded_send_never_waits() {
        let (close, mut rx) = result_channel::<usize>(None);
        let tx = close.sender();
        for i in 0..1000 {
            assert!(tx.send(i).await);
        }
        drop(tx);
        close.close();

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 1000);
    }

    #[tokio::test]
    async fn send_reports_dropped_receiver() {
        let (close, rx) = result_channel::<i32>(Some(1));
        drop(rx);
        assert!(!close.sender().send(7).await);
    }

    #[tokio::test]
    async fn send_after_close_is_refused() {
        let (close, mut rx) = result_channel::<i32>(Some(2));
        let tx = close.sender();
        assert!(tx.send(1).await);
        close.close();

        assert!(rx.is_closed());
        assert!(!tx.send(9).await, "closed channel must refuse sends");
        assert_eq!(rx.recv().await, Some(1));
        let end = timeout(Duration::from_millis(200), rx.recv()).await;
        assert_eq!(end.expect("closed channel must reach end-of-stream"), None);
    }

    #[tokio::test]
    async fn unbounded_send_after_close_is_refused() {
        let (close, mut rx) = result_channel::<i32>(None);
        let tx = close.sender();
        close.close();

        assert!(!tx.send(9).await);
        let end = timeout(Duration::from_millis(200), rx.recv()).await;
        assert_eq!(end.expect("closed channel must reach end-of-stream"), None);
    }

    #[tokio::test]
    async fn close_wakes_waiting_receiver_despite_live_sender() {
        let (close, mut rx) = result_channel::<i32>(Some(1));
        let tx = close.sender();
        let waiter = tokio::spawn(async move { rx.recv().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        close.close();

        let end = timeout(Duration::from_millis(200), waiter)
            .await
            .expect("receiver should wake on close")
            .unwrap();
        assert_eq!(end, None);
        drop(tx);
    }

    #[test]
    #[should_panic(expected = "result channel capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = result_channel::<i32>(Some(0));
    }
}

use log::debug;

use crate::channel::ResultReceiver;

/// Folds every result until the channel is closed and empty.
///
/// Results arrive in completion order, which differs between runs, so `fold`
/// should not depend on it. Never returns if the channel is never closed.
pub async fn drain<T, Acc, F>(receiver: &mut ResultReceiver<T>, initial: Acc, mut fold: F) -> Acc
where
    F: FnMut(Acc, T) -> Acc,
{
    let mut acc = initial;
    let mut received: usize = 0;
    while let Some(value) = receiver.recv().await {
        acc = fold(acc, value);
        received += 1;
    }
    debug!("result channel drained after {} results", received);

    acc
}

/// Fold step that appends each result to a `Vec`.
pub fn push<T>(mut results: Vec<T>, value: T) -> Vec<T> {
    results.push(value);
    results
}

/// Gathers every result in arrival order.
pub async fn collect<T>(receiver: &mut ResultReceiver<T>) -> Vec<T> {
    drain(receiver, Vec::new(), push).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::result_channel;

    #[tokio::test]
    async fn closed_empty_channel_returns_initial() {
        let (close, mut rx) = result_channel::<i64>(Some(1));
        close.close();

        let acc = drain(&mut rx, 42_i64, |acc, value| acc + value).await;
        assert_eq!(acc, 42);
    }

    #[tokio::test]
    async fn folds_buffered_results() {
        let (close, mut rx) = result_channel::<i64>(None);
        let tx = close.sender();
        for value in [3, 4, 5] {
            tx.send(value).await;
        }
        drop(tx);
        close.close();

        let product = drain(&mut rx, 1_i64, |acc, value| acc * value).await;
        assert_eq!(product, 60);
    }

    #[test]
    fn push_appends_in_order() {
        let results = push(push(Vec::new(), 1), 2);
        assert_eq!(results, vec![1, 2]);
    }

    #[tokio::test]
    async fn collect_keeps_arrival_order() {
        let (close, mut rx) = result_channel::<&str>(None);
        let tx = close.sender();
        tx.send("a").await;
        tx.send("b").await;
        drop(tx);
        close.close();

        assert_eq!(collect(&mut rx).await, vec!["a", "b"]);
    }
}

//! Fan-in: merging many per-worker channels into one.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::trace;

/// Merges `inputs` into a single receiver.
///
/// Values arrive in the order the inputs produce them. The returned channel
/// closes once every input has closed and all of its values were forwarded.
///
/// # Panics
///
/// Must be called from within a Tokio runtime.
pub fn merge<V: Send + 'static>(
    inputs: Vec<mpsc::Receiver<V>>,
    capacity: usize,
) -> mpsc::Receiver<V> {
    let (output, merged) = mpsc::channel(capacity.max(1));
    tokio::spawn(forward_all(inputs, output));
    merged
}

/// Forwards every value of every input into `output` and returns how many
/// values were forwarded.
///
/// One forwarder task runs per input. Each bumps a shared completion counter
/// when its input closes; `output` is dropped only once the counter equals
/// the number of inputs. Forwarders stop early if `output` has no receiver.
pub async fn forward_all<V: Send + 'static>(
    inputs: Vec<mpsc::Receiver<V>>,
    output: mpsc::Sender<V>,
) -> usize {
    let expected = inputs.len();
    let completed = Arc::new(AtomicUsize::new(0));

    let mut forwarders = JoinSet::new();
    for mut input in inputs {
        let output = output.clone();
        let completed = Arc::clone(&completed);
        forwarders.spawn(async move {
            let mut forwarded = 0;
            while let Some(value) = input.recv().await {
                if output.send(value).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            completed.fetch_add(1, Ordering::AcqRel);
            forwarded
        });
    }

    let mut forwarded = 0;
    while completed.load(Ordering::Acquire) < expected {
        match forwarders.join_next().await {
            Some(Ok(count)) => forwarded += count,
            Some(Err(join_err)) => {
                trace!(error = %join_err, "forwarder aborted");
            }
            None => break,
        }
    }
    // Counter may reach `expected` before the last handles are joined.
    while let Some(joined) = forwarders.join_next().await {
        if let Ok(count) = joined {
            forwarded += count;
        }
    }

    trace!(inputs = expected, forwarded, "fan-in complete");
    drop(output);
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_merge_forwards_every_value_then_closes() {
        let mut inputs = Vec::new();
        for worker in 0..10u64 {
            let (tx, rx) = mpsc::channel(1);
            inputs.push(rx);
            tokio::spawn(async move {
                tx.send(worker * 100).await.unwrap();
            });
        }

        let mut merged = merge(inputs, 4);
        let mut values = Vec::new();
        while let Some(value) = merged.recv().await {
            values.push(value);
        }

        values.sort_unstable();
        assert_eq!(values, (0..10).map(|w| w * 100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_forward_all_counts_multi_value_inputs() {
        let (tx_a, rx_a) = mpsc::channel(8);
        let (tx_b, rx_b) = mpsc::channel(8);
        for v in 0..3 {
            tx_a.send(v).await.unwrap();
        }
        tx_b.send(10).await.unwrap();
        drop((tx_a, tx_b));

        let (output, mut merged) = mpsc::channel(8);
        let forwarded = forward_all(vec![rx_a, rx_b], output).await;
        assert_eq!(forwarded, 4);

        let mut sum = 0;
        while let Some(v) = merged.recv().await {
            sum += v;
        }
        assert_eq!(sum, 13);
    }

    #[tokio::test]
    async fn test_merge_without_inputs_closes_immediately() {
        let mut merged = merge(Vec::<mpsc::Receiver<u8>>::new(), 1);
        assert!(merged.recv().await.is_none());
    }
}

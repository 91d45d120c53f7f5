//! Streaming partial results through per-partition channels.

use super::ParallelEngine;
use super::fan_in::forward_all;
use super::partition::{self, Partition};
use crate::error::ParallelError;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The value one partition produced, tagged with the partition it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult<S> {
    pub partition: Partition,
    pub value: S,
}

impl<S> PartialResult<S> {
    /// Number of source elements behind this result.
    pub fn size(&self) -> usize {
        self.partition.len()
    }
}

pub type PartialItem<S> = Result<PartialResult<S>, ParallelError>;

/// Single-pass stream of partial results in completion order.
///
/// A successful run yields exactly [`expected`](Self::expected) items. A
/// cancelled or failed run ends with one `Err` after the values that made it
/// through.
#[derive(Debug)]
pub struct PartialResults<S> {
    merged: mpsc::Receiver<PartialItem<S>>,
    expected: usize,
    received: usize,
}

impl<S> PartialResults<S> {
    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub async fn recv(&mut self) -> Option<PartialItem<S>> {
        let item = self.merged.recv().await;
        if let Some(Ok(_)) = &item {
            self.received += 1;
        }
        item
    }

    /// Drains the stream, failing on the first error item.
    pub async fn collect_all(mut self) -> Result<Vec<PartialResult<S>>, ParallelError> {
        let mut results = Vec::with_capacity(self.expected);
        while let Some(item) = self.recv().await {
            results.push(item?);
        }
        Ok(results)
    }
}

impl<S> Stream for PartialResults<S> {
    type Item = PartialItem<S>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.merged.poll_recv(cx);
        if let Poll::Ready(Some(Ok(_))) = &polled {
            this.received += 1;
        }
        polled
    }
}

impl ParallelEngine {
    /// Streams `per_partition` over consecutive chunks of `chunk_size`
    /// elements, yielding `ceil(len / chunk_size)` results.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn stream_partial_results<T, S, F>(
        &self,
        items: Arc<[T]>,
        chunk_size: usize,
        per_partition: F,
    ) -> PartialResults<S>
    where
        T: Send + Sync + 'static,
        S: Send + 'static,
        F: Fn(&[T]) -> S + Send + Sync + 'static,
    {
        let partitions = partition::by_size(items.len(), chunk_size);
        self.stream_over(items, partitions, per_partition)
    }

    /// Streams `per_partition` over exactly `partitions` partitions. Empty
    /// partitions still report, computed over an empty slice.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn stream_partitions<T, S, F>(
        &self,
        items: Arc<[T]>,
        partitions: usize,
        per_partition: F,
    ) -> PartialResults<S>
    where
        T: Send + Sync + 'static,
        S: Send + 'static,
        F: Fn(&[T]) -> S + Send + Sync + 'static,
    {
        let partitions = partition::by_count(items.len(), partitions);
        self.stream_over(items, partitions, per_partition)
    }

    fn stream_over<T, S, F>(
        &self,
        items: Arc<[T]>,
        partitions: Vec<Partition>,
        per_partition: F,
    ) -> PartialResults<S>
    where
        T: Send + Sync + 'static,
        S: Send + 'static,
        F: Fn(&[T]) -> S + Send + Sync + 'static,
    {
        let expected = partitions.len();
        let cancel = self.cancel.child_token();
        let (output, merged) = mpsc::channel(self.config.channel_capacity.max(1));

        let mut inputs = Vec::with_capacity(expected);
        let mut jobs = Vec::with_capacity(expected);
        for partition in partitions {
            let (tx, rx) = mpsc::channel(1);
            inputs.push(rx);
            jobs.push((partition, tx));
        }
        debug!(len = items.len(), partitions = expected, "streaming partial results");

        let pool = self.pool;
        let stop = cancel.clone();
        let run = tokio::spawn(async move {
            pool.run(
                jobs,
                cancel,
                move |(partition, tx): (Partition, mpsc::Sender<PartialItem<S>>), cancel| {
                    let value = per_partition(&items[partition.range()]);
                    if tx.blocking_send(Ok(PartialResult { partition, value })).is_err() {
                        // Nobody is listening anymore.
                        cancel.cancel();
                    }
                    Ok(())
                },
            )
            .await
        });

        tokio::spawn(async move {
            tokio::select! {
                _ = forward_all(inputs, output.clone()) => {}
                _ = output.closed() => {
                    debug!("partial result consumer dropped, cancelling workers");
                    stop.cancel();
                }
            }
            let outcome = match run.await {
                Ok(outcome) => outcome.map(|_| ()),
                Err(join_err) => Err(ParallelError::WorkerPanicked(join_err.to_string())),
            };
            if let Err(err) = outcome {
                warn!(error = %err, "partial result stream ended early");
                let _ = output.send(Err(err)).await;
            }
        });

        PartialResults {
            merged,
            expected,
            received: 0,
        }
    }
}

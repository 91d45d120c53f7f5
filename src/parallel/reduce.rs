//! Partitioned reduce and filter.

use super::partition::{self, Partition};
use super::ParallelEngine;
use crate::error::{ElementError, ParallelError};
use std::convert::Infallible;
use std::ops::Add;
use std::sync::Arc;
use tracing::debug;

impl ParallelEngine {
    /// Sums `selector(item)` over `items` using `partitions` partitions.
    ///
    /// Every partition is totalled with local state only; the orchestrator
    /// folds the partial totals once all workers have joined. The result does
    /// not depend on the partition count.
    pub async fn reduce_sum<T, S, F>(
        &self,
        items: Arc<[T]>,
        partitions: usize,
        selector: F,
    ) -> Result<S, ParallelError>
    where
        T: Send + Sync + 'static,
        S: Copy + Default + Add<Output = S> + Send + 'static,
        F: Fn(&T) -> S + Send + Sync + 'static,
    {
        self.try_reduce_sum(items, partitions, move |item| {
            Ok::<S, Infallible>(selector(item))
        })
        .await
    }

    /// Fallible form of [`reduce_sum`](Self::reduce_sum).
    ///
    /// The first selector error cancels the remaining workers and is returned
    /// as [`ParallelError::Element`] carrying the global index of the element.
    pub async fn try_reduce_sum<T, S, E, F>(
        &self,
        items: Arc<[T]>,
        partitions: usize,
        selector: F,
    ) -> Result<S, ParallelError>
    where
        T: Send + Sync + 'static,
        S: Copy + Default + Add<Output = S> + Send + 'static,
        E: Into<ElementError>,
        F: Fn(&T) -> Result<S, E> + Send + Sync + 'static,
    {
        let partitions = partition::by_count(items.len(), partitions);
        debug!(len = items.len(), partitions = partitions.len(), "reduce_sum");

        let partials = self
            .pool
            .run(
                partitions,
                self.cancel.child_token(),
                move |partition: Partition, cancel| {
                    let mut total = S::default();
                    for (offset, item) in items[partition.range()].iter().enumerate() {
                        cancel.check()?;
                        let value = selector(item)
                            .map_err(|e| ParallelError::element(partition.low + offset, e))?;
                        total = total + value;
                    }
                    Ok(total)
                },
            )
            .await?;

        Ok(partials
            .into_iter()
            .fold(S::default(), |total, partial| total + partial))
    }

    /// Collects the elements matching `predicate`.
    ///
    /// Partials are concatenated in partition order, so the result keeps the
    /// source order whatever order the workers finish in.
    pub async fn filter_by<T, F>(
        &self,
        items: Arc<[T]>,
        partitions: usize,
        predicate: F,
    ) -> Result<Vec<T>, ParallelError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.try_filter_by(items, partitions, move |item| {
            Ok::<bool, Infallible>(predicate(item))
        })
        .await
    }

    /// Fallible form of [`filter_by`](Self::filter_by) with fail-fast
    /// semantics.
    pub async fn try_filter_by<T, E, F>(
        &self,
        items: Arc<[T]>,
        partitions: usize,
        predicate: F,
    ) -> Result<Vec<T>, ParallelError>
    where
        T: Clone + Send + Sync + 'static,
        E: Into<ElementError>,
        F: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
    {
        let partitions = partition::by_count(items.len(), partitions);
        debug!(len = items.len(), partitions = partitions.len(), "filter_by");

        let mut partials = self
            .pool
            .run(
                partitions,
                self.cancel.child_token(),
                move |partition: Partition, cancel| {
                    let mut matched = Vec::new();
                    for (offset, item) in items[partition.range()].iter().enumerate() {
                        cancel.check()?;
                        let keep = predicate(item)
                            .map_err(|e| ParallelError::element(partition.low + offset, e))?;
                        if keep {
                            matched.push(item.clone());
                        }
                    }
                    Ok((partition.index, matched))
                },
            )
            .await?;

        partials.sort_unstable_by_key(|(index, _)| *index);
        Ok(partials.into_iter().flat_map(|(_, matched)| matched).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::parallel::CancelToken;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine(workers: usize) -> ParallelEngine {
        ParallelEngine::new(EngineConfig::default().with_max_workers(Some(workers)))
    }

    #[tokio::test]
    async fn test_sum_of_first_million_integers() {
        let items: Arc<[i64]> = (0..1_000_000).collect();
        let total = engine(4).reduce_sum(items, 10, |v| *v).await.unwrap();
        assert_eq!(total, 499_999_500_000);
    }

    #[tokio::test]
    async fn test_sum_of_payment_amounts() {
        let items: Arc<[i64]> = Arc::from(vec![10, 10, 15, 25, 30, 50, 60, 50]);
        let total = engine(2).reduce_sum(items, 3, |v| *v).await.unwrap();
        assert_eq!(total, 250);
    }

    #[tokio::test]
    async fn test_sum_of_empty_sequence_is_zero() {
        let items: Arc<[i64]> = Arc::from(Vec::new());
        assert_eq!(engine(2).reduce_sum(items, 4, |v| *v).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sum_does_not_mutate_input() {
        let items: Arc<[i64]> = (1..=1_000).collect();
        let engine = engine(3);
        let first = engine.reduce_sum(Arc::clone(&items), 7, |v| *v).await.unwrap();
        let second = engine.reduce_sum(Arc::clone(&items), 7, |v| *v).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(items.iter().sum::<i64>(), first);
    }

    #[tokio::test]
    async fn test_try_reduce_fails_fast_with_element_index() {
        let items: Arc<[i64]> = (0..10_000).collect();
        let result = engine(4)
            .try_reduce_sum(items, 8, |v| {
                if *v == 5_000 {
                    Err(format!("cannot sum {v}"))
                } else {
                    Ok(*v)
                }
            })
            .await;

        match result {
            Err(ParallelError::Element { index, source }) => {
                assert_eq!(index, 5_000);
                assert_eq!(source.to_string(), "cannot sum 5000");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_selector_error_stops_other_partitions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let items: Arc<[i64]> = (0..2_000).collect();

        let counter = Arc::clone(&calls);
        let result = engine(2)
            .try_reduce_sum(items, 2, move |v| {
                counter.fetch_add(1, Ordering::SeqCst);
                if *v == 0 {
                    return Err("first element is invalid");
                }
                std::thread::sleep(std::time::Duration::from_millis(1));
                Ok(*v)
            })
            .await;

        assert!(matches!(result, Err(ParallelError::Element { index: 0, .. })));
        let calls = calls.load(Ordering::SeqCst);
        assert!(calls < 100, "selector ran {calls} times after the failure");
    }

    #[tokio::test]
    async fn test_cancelled_reduce_reports_cancelled() {
        let cancel = CancelToken::new();
        let engine = engine(2).with_cancel_token(cancel.clone());
        let items: Arc<[i64]> = (0..100_000).collect();

        let result = engine
            .reduce_sum(items, 4, move |v| {
                if *v == 10 {
                    cancel.cancel();
                }
                *v
            })
            .await;

        assert!(matches!(result, Err(ParallelError::Cancelled)));
    }

    #[tokio::test]
    async fn test_filter_keeps_source_order() {
        let items: Arc<[u32]> = (0..1_000).collect();
        let evens = engine(4)
            .filter_by(items, 9, |v| v % 2 == 0)
            .await
            .unwrap();
        assert_eq!(evens, (0..1_000).step_by(2).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_filter_with_more_partitions_than_elements() {
        let items: Arc<[&str]> = Arc::from(vec!["bank", "auto", "bank"]);
        let banks = engine(2)
            .filter_by(items, 10, |c| *c == "bank")
            .await
            .unwrap();
        assert_eq!(banks, vec!["bank", "bank"]);
    }

    #[tokio::test]
    async fn test_try_filter_propagates_error() {
        let items: Arc<[i32]> = Arc::from(vec![1, 2, -3, 4]);
        let result = engine(2)
            .try_filter_by(items, 2, |v| {
                if *v < 0 {
                    Err("negative value")
                } else {
                    Ok(*v > 1)
                }
            })
            .await;
        assert!(matches!(result, Err(ParallelError::Element { index: 2, .. })));
    }
}

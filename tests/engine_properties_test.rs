use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use wallet::config::EngineConfig;
use wallet::parallel::ParallelEngine;

fn engine() -> ParallelEngine {
    ParallelEngine::new(EngineConfig::default().with_max_workers(Some(4)))
}

fn random_sequence(rng: &mut StdRng, len: usize) -> Arc<[i64]> {
    (0..len).map(|_| rng.gen_range(-1_000..1_000)).collect()
}

fn multiset(values: &[i64]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for v in values {
        *counts.entry(*v).or_insert(0) += 1;
    }
    counts
}

#[tokio::test]
async fn test_sum_is_independent_of_partition_count() {
    let mut rng = StdRng::seed_from_u64(7);
    let engine = engine();

    for len in [0, 1, 2, 17, 256, 1_000] {
        let items = random_sequence(&mut rng, len);
        let expected = engine.reduce_sum(Arc::clone(&items), 1, |v| *v).await.unwrap();
        assert_eq!(expected, items.iter().sum::<i64>());

        for partitions in [2, 3, 7, 16, len + 1, len + 10] {
            let total = engine
                .reduce_sum(Arc::clone(&items), partitions, |v| *v)
                .await
                .unwrap();
            assert_eq!(total, expected, "len={len} partitions={partitions}");
        }
    }
}

#[tokio::test]
async fn test_filter_matches_single_partition_result() {
    let mut rng = StdRng::seed_from_u64(11);
    let engine = engine();

    for len in [0, 5, 99, 1_000] {
        let items = random_sequence(&mut rng, len);
        let baseline = engine
            .filter_by(Arc::clone(&items), 1, |v| v % 3 == 0)
            .await
            .unwrap();

        for partitions in [2, 4, 9, len + 3] {
            let filtered = engine
                .filter_by(Arc::clone(&items), partitions, |v| v % 3 == 0)
                .await
                .unwrap();
            assert_eq!(multiset(&filtered), multiset(&baseline));
            assert_eq!(filtered, baseline);
        }
    }
}

#[tokio::test]
async fn test_stream_count_and_total_match_reduce() {
    let mut rng = StdRng::seed_from_u64(13);
    let engine = engine();

    for (len, chunk) in [(0, 5), (1, 5), (10, 5), (11, 5), (1_000, 64), (1_000, 1_000)] {
        let items = random_sequence(&mut rng, len);
        let expected = engine.reduce_sum(Arc::clone(&items), 1, |v| *v).await.unwrap();

        let results = engine
            .stream_partial_results(Arc::clone(&items), chunk, |c| c.iter().sum::<i64>())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(results.len(), len.div_ceil(chunk));
        assert_eq!(results.iter().map(|r| r.value).sum::<i64>(), expected);
        assert_eq!(results.iter().map(|r| r.size()).sum::<usize>(), len);
    }
}

#[tokio::test]
async fn test_single_worker_still_processes_every_partition() {
    let engine = ParallelEngine::new(EngineConfig::default().with_max_workers(Some(1)));
    assert_eq!(engine.config().max_workers, 1);
    let items: Arc<[i64]> = (0..1_000_000).collect();
    let total = engine.reduce_sum(items, 10, |v| *v).await.unwrap();
    assert_eq!(total, 499_999_500_000);
}

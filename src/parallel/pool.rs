//! Bounded worker pool draining a shared job queue.

use super::cancel::CancelToken;
use crate::error::ParallelError;
use crossbeam::queue::SegQueue;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, trace};

/// Runs jobs on at most `max_workers` blocking threads.
///
/// Jobs are queued up front; every worker pops jobs until the queue is empty,
/// so the number of jobs only sets the queue depth, never the thread count.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_workers: usize,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Runs `work` over every job and returns the produced values in
    /// completion order.
    ///
    /// The token is checked before each job. The first job error cancels the
    /// token so the remaining workers stop early; that error is returned in
    /// preference to the `Cancelled` errors it causes. A panicking worker
    /// cancels the run and surfaces as [`ParallelError::WorkerPanicked`].
    pub async fn run<J, R, F>(
        &self,
        jobs: Vec<J>,
        cancel: CancelToken,
        work: F,
    ) -> Result<Vec<R>, ParallelError>
    where
        J: Send + 'static,
        R: Send + 'static,
        F: Fn(J, &CancelToken) -> Result<R, ParallelError> + Send + Sync + 'static,
    {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let total = jobs.len();
        let workers = self.max_workers.min(total);
        let queue = Arc::new(SegQueue::new());
        for job in jobs {
            queue.push(job);
        }
        let work = Arc::new(work);

        debug!(jobs = total, workers, "dispatching worker pool");

        let mut set = JoinSet::new();
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let work = Arc::clone(&work);
            let cancel = cancel.clone();
            set.spawn_blocking(move || -> Result<Vec<R>, ParallelError> {
                let mut produced = Vec::new();
                while let Some(job) = queue.pop() {
                    cancel.check()?;
                    match work(job, &cancel) {
                        Ok(value) => produced.push(value),
                        Err(err) => {
                            cancel.cancel();
                            return Err(err);
                        }
                    }
                }
                trace!(worker, jobs = produced.len(), "worker drained queue");
                Ok(produced)
            });
        }

        let mut results = Vec::with_capacity(total);
        let mut failure: Option<ParallelError> = None;
        while let Some(joined) = set.join_next().await {
            let outcome = joined.unwrap_or_else(|join_err| {
                cancel.cancel();
                Err(ParallelError::WorkerPanicked(join_err.to_string()))
            });
            match outcome {
                Ok(produced) => results.extend(produced),
                Err(err) => {
                    failure = Some(match failure {
                        Some(first) if !first.is_cancelled() => first,
                        _ => err,
                    });
                }
            }
        }

        match failure {
            Some(err) => {
                debug!(error = %err, "worker pool aborted");
                Err(err)
            }
            None => Ok(results),
        }
    }
}

//! Parallel partition engine.
//!
//! A sequence is split into contiguous partitions (see [`partition`]), the
//! partitions are queued on a bounded [`pool::WorkerPool`], and each worker
//! returns its partial result by value. Two ways of combining the partials
//! are offered:
//!
//! - reduce/filter: the orchestrator waits for every worker and folds the
//!   partials itself ([`ParallelEngine::reduce_sum`], [`ParallelEngine::filter_by`]);
//! - streaming: each partition reports on a private channel and the channels
//!   are merged into one [`stream::PartialResults`] stream (see [`fan_in`]).
//!
//! Every operation runs under a child of the engine's [`CancelToken`].

pub mod cancel;
pub mod fan_in;
pub mod partition;
pub mod pool;
pub mod reduce;
pub mod stream;

pub use cancel::CancelToken;
pub use partition::Partition;
pub use stream::{PartialResult, PartialResults};

use crate::config::EngineConfig;
use pool::WorkerPool;

#[derive(Debug, Clone)]
pub struct ParallelEngine {
    config: EngineConfig,
    pool: WorkerPool,
    cancel: CancelToken,
}

impl Default for ParallelEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ParallelEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pool: WorkerPool::new(config.max_workers),
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the engine's root token. Cancelling it aborts every
    /// operation started afterwards or still in flight.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

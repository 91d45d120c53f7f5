//! Runtime configuration for the parallel engine and the wallet service.

/// Chunk length used when streaming payment totals as progress records.
pub const DEFAULT_PROGRESS_CHUNK_SIZE: usize = 100_000;

/// Capacity of the merged channel handed to streaming consumers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on concurrently running workers.
    pub max_workers: usize,
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get().max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Sets the worker bound. `None` or 0 keeps the CPU-count default.
    pub fn with_max_workers(mut self, workers: Option<usize>) -> Self {
        if let Some(workers) = workers.filter(|w| *w > 0) {
            self.max_workers = workers;
        }
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletConfig {
    pub engine: EngineConfig,
    pub progress_chunk_size: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            progress_chunk_size: DEFAULT_PROGRESS_CHUNK_SIZE,
        }
    }
}

impl WalletConfig {
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_progress_chunk_size(mut self, size: usize) -> Self {
        self.progress_chunk_size = size.max(1);
        self
    }
}

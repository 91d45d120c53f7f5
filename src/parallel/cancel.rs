use crate::error::ParallelError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared by an orchestrator and its workers.
///
/// Cancelling a token cancels every token derived from it through
/// [`CancelToken::child_token`]. Cancelling a child leaves its parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    parent: Option<CancelToken>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_token(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(CancelToken::is_cancelled)
    }

    /// Returns `Err(ParallelError::Cancelled)` once the token is cancelled.
    pub fn check(&self) -> Result<(), ParallelError> {
        if self.is_cancelled() {
            Err(ParallelError::Cancelled)
        } else {
            Ok(())
        }
    }
}

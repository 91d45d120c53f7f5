use thiserror::Error;

pub type Result<T> = std::result::Result<T, WalletError>;

/// Boxed error produced by a caller-supplied selector or predicate.
pub type ElementError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a parallel partition run.
#[derive(Error, Debug)]
pub enum ParallelError {
    #[error("parallel operation was cancelled")]
    Cancelled,
    #[error("element {index} failed: {source}")]
    Element {
        index: usize,
        #[source]
        source: ElementError,
    },
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
}

impl ParallelError {
    pub fn element(index: usize, source: impl Into<ElementError>) -> Self {
        Self::Element {
            index,
            source: source.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("phone already registered")]
    PhoneRegistered,
    #[error("amount must be greater than zero")]
    AmountMustBePositive,
    #[error("account not found")]
    AccountNotFound,
    #[error("not enough balance")]
    NotEnoughBalance,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("favorite not found")]
    FavoriteNotFound,
    #[error("invalid record in {file}: {message}")]
    InvalidRecord { file: String, message: String },
    #[error("Parallel error: {0}")]
    Parallel(#[from] ParallelError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

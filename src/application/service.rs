use crate::config::WalletConfig;
use crate::domain::account::{Account, Phone};
use crate::domain::money::Money;
use crate::domain::payment::{Favorite, Payment, PaymentCategory, PaymentStatus, Progress};
use crate::domain::ports::{AccountStoreBox, FavoriteStoreBox, PaymentStoreBox};
use crate::error::{Result, WalletError};
use crate::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryFavoriteStore, InMemoryPaymentStore,
};
use crate::parallel::ParallelEngine;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, info};

/// The wallet: account and payment bookkeeping on top of the storage ports,
/// with aggregate queries delegated to the [`ParallelEngine`].
///
/// Individual operations are not transactional with respect to each other.
pub struct WalletService {
    accounts: AccountStoreBox,
    payments: PaymentStoreBox,
    favorites: FavoriteStoreBox,
    engine: ParallelEngine,
    next_account_id: AtomicI64,
    progress_chunk_size: usize,
}

impl WalletService {
    /// Creates a new `WalletService`.
    ///
    /// # Arguments
    ///
    /// * `accounts` - The store for accounts.
    /// * `payments` - The store for payments.
    /// * `favorites` - The store for favorite payments.
    /// * `config` - Engine and progress settings.
    pub fn new(
        accounts: AccountStoreBox,
        payments: PaymentStoreBox,
        favorites: FavoriteStoreBox,
        config: WalletConfig,
    ) -> Self {
        Self {
            accounts,
            payments,
            favorites,
            engine: ParallelEngine::new(config.engine),
            next_account_id: AtomicI64::new(0),
            progress_chunk_size: config.progress_chunk_size.max(1),
        }
    }

    /// Creates a service backed by fresh in-memory stores.
    pub fn in_memory(config: WalletConfig) -> Self {
        Self::new(
            Box::new(InMemoryAccountStore::new()),
            Box::new(InMemoryPaymentStore::new()),
            Box::new(InMemoryFavoriteStore::new()),
            config,
        )
    }

    pub fn engine(&self) -> &ParallelEngine {
        &self.engine
    }

    pub async fn register_account(&self, phone: impl Into<Phone>) -> Result<Account> {
        let phone = phone.into();
        if self.accounts.find_by_phone(&phone).await?.is_some() {
            return Err(WalletError::PhoneRegistered);
        }

        let id = self.next_account_id.fetch_add(1, Ordering::SeqCst) + 1;
        let account = Account::new(id, phone);
        self.accounts.store(account.clone()).await?;
        debug!(account = id, "registered account");
        Ok(account)
    }

    pub async fn deposit(&self, account_id: i64, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(WalletError::AmountMustBePositive);
        }
        let mut account = self.find_account_by_id(account_id).await?;
        account.deposit(amount)?;
        self.accounts.store(account).await
    }

    pub async fn pay(
        &self,
        account_id: i64,
        amount: Money,
        category: impl Into<PaymentCategory>,
    ) -> Result<Payment> {
        if !amount.is_positive() {
            return Err(WalletError::AmountMustBePositive);
        }
        let mut account = self.find_account_by_id(account_id).await?;
        account.withdraw(amount)?;

        let payment = Payment::new(account_id, amount, category.into());
        self.accounts.store(account).await?;
        self.payments.store(payment.clone()).await?;
        debug!(account = account_id, payment = %payment.id, %amount, "payment made");
        Ok(payment)
    }

    pub async fn find_account_by_id(&self, account_id: i64) -> Result<Account> {
        self.accounts
            .get(account_id)
            .await?
            .ok_or(WalletError::AccountNotFound)
    }

    pub async fn find_payment_by_id(&self, payment_id: &str) -> Result<Payment> {
        self.payments
            .get(payment_id)
            .await?
            .ok_or(WalletError::PaymentNotFound)
    }

    pub async fn find_favorite_by_id(&self, favorite_id: &str) -> Result<Favorite> {
        self.favorites
            .get(favorite_id)
            .await?
            .ok_or(WalletError::FavoriteNotFound)
    }

    /// Marks a payment as failed and refunds its amount. Rejecting a payment
    /// that already failed changes nothing.
    pub async fn reject(&self, payment_id: &str) -> Result<()> {
        let mut payment = self.find_payment_by_id(payment_id).await?;
        if payment.is_failed() {
            return Ok(());
        }
        let mut account = self.find_account_by_id(payment.account_id).await?;

        payment.status = PaymentStatus::Fail;
        account.refund(payment.amount);
        self.accounts.store(account).await?;
        self.payments.store(payment).await
    }

    /// Makes a new payment with the same account, amount and category.
    pub async fn repeat(&self, payment_id: &str) -> Result<Payment> {
        let payment = self.find_payment_by_id(payment_id).await?;
        self.pay(payment.account_id, payment.amount, payment.category)
            .await
    }

    pub async fn favorite_payment(&self, payment_id: &str, name: &str) -> Result<Favorite> {
        let payment = self.find_payment_by_id(payment_id).await?;
        let favorite = Favorite::from_payment(&payment, name);
        self.favorites.store(favorite.clone()).await?;
        Ok(favorite)
    }

    pub async fn pay_from_favorite(&self, favorite_id: &str) -> Result<Payment> {
        let favorite = self.find_favorite_by_id(favorite_id).await?;
        self.pay(favorite.account_id, favorite.amount, favorite.category)
            .await
    }

    /// Total amount of all payments, summed over `partitions` partitions.
    pub async fn sum_payments(&self, partitions: usize) -> Result<Money> {
        let payments = self.payment_snapshot().await?;
        let total = self
            .engine
            .reduce_sum(payments, partitions, |p: &Payment| p.amount)
            .await?;
        info!(%total, partitions, "summed payments");
        Ok(total)
    }

    /// Payments of one account, in the order they were made.
    pub async fn filter_payments(&self, account_id: i64, partitions: usize) -> Result<Vec<Payment>> {
        self.find_account_by_id(account_id).await?;
        self.filter_payments_by_fn(move |p| p.account_id == account_id, partitions)
            .await
    }

    pub async fn filter_payments_by_fn<F>(&self, filter: F, partitions: usize) -> Result<Vec<Payment>>
    where
        F: Fn(&Payment) -> bool + Send + Sync + 'static,
    {
        let payments = self.payment_snapshot().await?;
        Ok(self.engine.filter_by(payments, partitions, filter).await?)
    }

    /// Streams the payment total chunk by chunk.
    ///
    /// Each item covers `progress_chunk_size` payments (the last one fewer);
    /// items arrive in the order the chunks finish.
    pub async fn sum_payments_with_progress(
        &self,
    ) -> Result<impl Stream<Item = Result<Progress>> + Unpin> {
        let payments = self.payment_snapshot().await?;
        let partials = self.engine.stream_partial_results(
            payments,
            self.progress_chunk_size,
            |chunk: &[Payment]| chunk.iter().map(|p| p.amount).sum::<Money>(),
        );

        Ok(partials.map(|item| {
            item.map(|partial| Progress {
                part: partial.size(),
                result: partial.value,
            })
            .map_err(WalletError::from)
        }))
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.accounts.all().await
    }

    pub async fn payments(&self) -> Result<Vec<Payment>> {
        self.payments.all().await
    }

    pub async fn favorites(&self) -> Result<Vec<Favorite>> {
        self.favorites.all().await
    }

    /// Inserts or replaces an account by id. New accounts registered later
    /// get ids above every restored one.
    pub async fn restore_account(&self, account: Account) -> Result<()> {
        self.next_account_id.fetch_max(account.id, Ordering::SeqCst);
        self.accounts.store(account).await
    }

    pub async fn restore_payment(&self, payment: Payment) -> Result<()> {
        self.payments.store(payment).await
    }

    pub async fn restore_favorite(&self, favorite: Favorite) -> Result<()> {
        self.favorites.store(favorite).await
    }

    async fn payment_snapshot(&self) -> Result<Arc<[Payment]>> {
        Ok(self.payments.all().await?.into())
    }
}

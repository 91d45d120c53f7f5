use super::account::{Account, Phone};
use super::payment::{Favorite, Payment};
use crate::error::Result;
use async_trait::async_trait;

/// Storage for accounts. `store` inserts or replaces by id; `all` returns
/// accounts in first-insertion order.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn store(&self, account: Account) -> Result<()>;
    async fn get(&self, id: i64) -> Result<Option<Account>>;
    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Account>>;
    async fn all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Payment>>;
    async fn all(&self) -> Result<Vec<Payment>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn store(&self, favorite: Favorite) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Favorite>>;
    async fn all(&self) -> Result<Vec<Favorite>>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type FavoriteStoreBox = Box<dyn FavoriteStore>;

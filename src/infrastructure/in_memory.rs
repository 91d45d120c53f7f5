use crate::domain::account::{Account, Phone};
use crate::domain::payment::{Favorite, Payment};
use crate::domain::ports::{AccountStore, FavoriteStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Records in insertion order with a key index. Re-storing a key replaces the
/// record in place.
#[derive(Debug)]
struct Table<K, V> {
    rows: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Table<K, V> {
    fn upsert(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&position) => self.rows[position] = value,
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(value);
            }
        }
    }

    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).map(|&position| self.rows[position].clone())
    }

    fn all(&self) -> Vec<V> {
        self.rows.clone()
    }
}

/// A thread-safe in-memory store for accounts.
///
/// Uses `Arc<RwLock<..>>` so clones share the same data.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<Table<i64, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.upsert(account.id, account);
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id))
    }

    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.rows.iter().find(|a| &a.phone == phone).cloned())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.all())
    }
}

/// A thread-safe in-memory store for payments.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<Table<String, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.upsert(payment.id.clone(), payment);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id))
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.all())
    }
}

/// A thread-safe in-memory store for favorites.
#[derive(Default, Clone)]
pub struct InMemoryFavoriteStore {
    favorites: Arc<RwLock<Table<String, Favorite>>>,
}

impl InMemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteStore for InMemoryFavoriteStore {
    async fn store(&self, favorite: Favorite) -> Result<()> {
        let mut favorites = self.favorites.write().await;
        favorites.upsert(favorite.id.clone(), favorite);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Favorite>> {
        let favorites = self.favorites.read().await;
        Ok(favorites.get(id))
    }

    async fn all(&self) -> Result<Vec<Favorite>> {
        let favorites = self.favorites.read().await;
        Ok(favorites.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;

    #[tokio::test]
    async fn test_in_memory_account_store() {
        let store = InMemoryAccountStore::new();
        let mut account = Account::new(1, "+992000000001".into());
        account.balance = Money(100);

        store.store(account.clone()).await.unwrap();
        let retrieved = store.get(1).await.unwrap().unwrap();
        assert_eq!(retrieved, account);

        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_account_store_find_by_phone() {
        let store = InMemoryAccountStore::new();
        store.store(Account::new(1, "1111".into())).await.unwrap();
        store.store(Account::new(2, "2222".into())).await.unwrap();

        let found = store.find_by_phone(&"2222".into()).await.unwrap().unwrap();
        assert_eq!(found.id, 2);
        assert!(store.find_by_phone(&"3333".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_insertion_order() {
        let store = InMemoryAccountStore::new();
        store.store(Account::new(2, "2222".into())).await.unwrap();
        store.store(Account::new(1, "1111".into())).await.unwrap();

        let mut updated = Account::new(2, "2222".into());
        updated.balance = Money(50);
        store.store(updated).await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 2);
        assert_eq!(all[0].balance, Money(50));
        assert_eq!(all[1].id, 1);
    }

    #[tokio::test]
    async fn test_in_memory_payment_store() {
        let store = InMemoryPaymentStore::new();
        let payment = Payment::new(1, Money(100), "auto".into());

        store.store(payment.clone()).await.unwrap();
        let retrieved = store.get(&payment.id).await.unwrap().unwrap();
        assert_eq!(retrieved, payment);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_favorite_store() {
        let store = InMemoryFavoriteStore::new();
        let payment = Payment::new(1, Money(100), "auto".into());
        let favorite = Favorite::from_payment(&payment, "my_auto");

        store.store(favorite.clone()).await.unwrap();
        assert_eq!(store.get(&favorite.id).await.unwrap(), Some(favorite));
        assert_eq!(store.all().await.unwrap().len(), 1);
    }
}

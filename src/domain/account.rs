use super::money::Money;
use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phone number an account is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(pub String);

impl From<&str> for Phone {
    fn from(phone: &str) -> Self {
        Self(phone.to_string())
    }
}

impl From<String> for Phone {
    fn from(phone: String) -> Self {
        Self(phone)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user account and its current balance.
///
/// Field order is the column order of `accounts.dump`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Account {
    pub id: i64,
    pub phone: Phone,
    pub balance: Money,
}

impl Account {
    pub fn new(id: i64, phone: Phone) -> Self {
        Self {
            id,
            phone,
            balance: Money::ZERO,
        }
    }

    /// Credits a positive amount.
    pub fn deposit(&mut self, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(WalletError::AmountMustBePositive);
        }
        self.balance += amount;
        Ok(())
    }

    /// Debits a positive amount if the balance covers it.
    pub fn withdraw(&mut self, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(WalletError::AmountMustBePositive);
        }
        if self.balance < amount {
            return Err(WalletError::NotEnoughBalance);
        }
        self.balance -= amount;
        Ok(())
    }

    /// Returns a previously debited amount.
    pub fn refund(&mut self, amount: Money) {
        self.balance += amount;
    }
}

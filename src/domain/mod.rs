//! Ledger domain: money, accounts, payments and the storage ports.

pub mod account;
pub mod money;
pub mod payment;
pub mod ports;

pub use account::{Account, Phone};
pub use money::Money;
pub use payment::{Favorite, Payment, PaymentCategory, PaymentStatus, Progress};

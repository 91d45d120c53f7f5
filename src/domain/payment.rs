use super::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category a payment was made in (auto, pharmacy, restaurant, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentCategory(pub String);

impl From<&str> for PaymentCategory {
    fn from(category: &str) -> Self {
        Self(category.to_string())
    }
}

impl From<String> for PaymentCategory {
    fn from(category: String) -> Self {
        Self(category)
    }
}

impl fmt::Display for PaymentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum PaymentStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAIL")]
    Fail,
    #[default]
    #[serde(rename = "INPROGRESS")]
    InProgress,
}

/// A payment made from an account.
///
/// Field order is the column order of `payments.dump`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Payment {
    pub id: String,
    pub account_id: i64,
    pub amount: Money,
    pub category: PaymentCategory,
    pub status: PaymentStatus,
}

impl Payment {
    /// Creates an in-progress payment with a fresh identifier.
    pub fn new(account_id: i64, amount: Money, category: PaymentCategory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id,
            amount,
            category,
            status: PaymentStatus::InProgress,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == PaymentStatus::Fail
    }
}

/// A saved payment template that can be paid again by id.
///
/// Field order is the column order of `favorites.dump`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Favorite {
    pub id: String,
    pub account_id: i64,
    pub name: String,
    pub amount: Money,
    pub category: PaymentCategory,
}

impl Favorite {
    pub fn from_payment(payment: &Payment, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: payment.account_id,
            name: name.into(),
            amount: payment.amount,
            category: payment.category.clone(),
        }
    }
}

/// Progress record: the size of a chunk of payments and the sum of its amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub part: usize,
    pub result: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_payment_is_in_progress_with_unique_id() {
        let a = Payment::new(1, Money(10), "auto".into());
        let b = Payment::new(1, Money(10), "auto".into());
        assert_eq!(a.status, PaymentStatus::InProgress);
        assert!(!a.is_failed());
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_favorite_copies_payment_details() {
        let payment = Payment::new(3, Money(36), "auto".into());
        let favorite = Favorite::from_payment(&payment, "my_auto");
        assert_eq!(favorite.account_id, 3);
        assert_eq!(favorite.amount, Money(36));
        assert_eq!(favorite.category, PaymentCategory::from("auto"));
        assert_eq!(favorite.name, "my_auto");
        assert_ne!(favorite.id, payment.id);
    }

    #[test]
    fn test_payment_record_layout() {
        let mut payment = Payment::new(1, Money(10), "auto".into());
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(b';')
            .from_writer(vec![]);
        writer.serialize(&payment).unwrap();
        payment.status = PaymentStatus::Fail;
        writer.serialize(&payment).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let lines: Vec<&str> = data.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("{};1;10;auto;INPROGRESS", payment.id));
        assert_eq!(lines[1], format!("{};1;10;auto;FAIL", payment.id));
    }
}

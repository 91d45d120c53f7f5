#![allow(dead_code)]

use wallet::application::service::WalletService;
use wallet::config::{EngineConfig, WalletConfig};
use wallet::domain::Money;

pub fn service(workers: usize) -> WalletService {
    WalletService::in_memory(
        WalletConfig::default()
            .with_engine(EngineConfig::default().with_max_workers(Some(workers))),
    )
}

/// Three accounts, twelve payments, 363 paid in total. Account 1 holds eight
/// payments (250 in total), two of them in "bank".
pub async fn seed_ledger(service: &WalletService) {
    let account = service.register_account("1111").await.unwrap();
    service.deposit(account.id, Money(500)).await.unwrap();
    for (amount, category) in [
        (10, "food"),
        (10, "phone"),
        (15, "cafe"),
        (25, "auto"),
        (30, "restaurant"),
        (50, "auto"),
        (60, "bank"),
        (50, "bank"),
    ] {
        service
            .pay(account.id, Money(amount), category)
            .await
            .unwrap();
    }

    let account = service.register_account("2222").await.unwrap();
    service.deposit(account.id, Money(200)).await.unwrap();
    service.pay(account.id, Money(40), "phone").await.unwrap();

    let account = service.register_account("3333").await.unwrap();
    service.deposit(account.id, Money(300)).await.unwrap();
    for (amount, category) in [(36, "auto"), (12, "food"), (25, "phone")] {
        service
            .pay(account.id, Money(amount), category)
            .await
            .unwrap();
    }
}

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use lumin_core::{
    storage::PersistenceGateway, Account, AccountService, AccountTransaction, Ledger,
    TransactionService,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Fixed reference instant so ordering assertions are deterministic.
pub fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 14, 9, 30, 0).unwrap()
}

pub fn add_account<G: PersistenceGateway>(
    ledger: &mut Ledger<G>,
    name: &str,
    currency: &str,
    starting_balance: Decimal,
) -> Account {
    let account = Account::new(name, currency, starting_balance, "AccountImage1")
        .expect("valid account");
    AccountService::add(ledger, account.clone()).expect("add account");
    account
}

pub fn add_transaction<G: PersistenceGateway>(
    ledger: &mut Ledger<G>,
    account: &Account,
    amount: Decimal,
    title: &str,
    days_after_base: i64,
) -> Uuid {
    let txn = AccountTransaction::new(
        amount,
        base_date() + Duration::days(days_after_base),
        title,
        account,
    )
    .expect("valid transaction");
    TransactionService::add(ledger, txn).expect("add transaction")
}

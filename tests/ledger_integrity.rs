mod common;

use std::collections::HashSet;

use common::{add_account, add_transaction};
use lumin_core::{
    errors::{LedgerError, ValidationError},
    storage::{FetchRequest, PersistenceGateway},
    Account, AccountChanges, AccountService, AccountTransaction, Currency, FxTable, Ledger,
    SummaryService, TransactionService,
};
use rust_decimal_macros::dec;

#[test]
fn checking_account_scenario_balance_and_wealth() {
    let mut ledger = Ledger::in_memory();
    let checking = add_account(&mut ledger, "Checking", "GBP", dec!(100));
    add_transaction(&mut ledger, &checking, dec!(-40), "Groceries", 0);
    add_transaction(&mut ledger, &checking, dec!(15), "Refund", 1);

    let balance = SummaryService::current_balance(&ledger, checking.id()).unwrap();
    assert_eq!(balance, dec!(75));

    let wealth = SummaryService::total_wealth(&ledger, FxTable::standard(), Currency::USD);
    assert_eq!(wealth.currency, Currency::USD);
    assert!((wealth.total - dec!(75) / dec!(0.79)).abs() < dec!(0.000001));
    assert_eq!(wealth.total.round_dp(2), dec!(94.94));
    assert!(wealth.warnings.is_empty());
}

#[test]
fn balance_equals_starting_balance_plus_sum_of_owned_amounts() {
    let mut ledger = Ledger::in_memory();
    let empty = add_account(&mut ledger, "Empty", "EUR", dec!(12.34));
    let busy = add_account(&mut ledger, "Busy", "USD", dec!(0));
    let amounts = [dec!(10.50), dec!(-3.25), dec!(100), dec!(-0.01)];
    for (day, amount) in amounts.iter().enumerate() {
        add_transaction(&mut ledger, &busy, *amount, "Item", day as i64);
    }

    assert_eq!(
        SummaryService::current_balance(&ledger, empty.id()).unwrap(),
        dec!(12.34)
    );
    let expected: rust_decimal::Decimal = amounts.iter().sum();
    assert_eq!(
        SummaryService::current_balance(&ledger, busy.id()).unwrap(),
        expected
    );
}

#[test]
fn deleting_account_cascades_to_its_transactions_only() {
    let mut ledger = Ledger::in_memory();
    let a = add_account(&mut ledger, "A", "GBP", dec!(50));
    let b = add_account(&mut ledger, "B", "GBP", dec!(10));
    add_transaction(&mut ledger, &a, dec!(-5), "Coffee", 0);
    add_transaction(&mut ledger, &a, dec!(20), "Gift", 1);
    let before = ledger.transaction_count();

    let removed = AccountService::remove(&mut ledger, a.id()).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(ledger.transaction_count(), before - 2);
    assert!(ledger.account(a.id()).is_none());
    assert!(ledger.account(b.id()).is_some());
    let survivors = ledger.gateway().fetch(&FetchRequest::transactions());
    assert!(survivors.is_empty());
    assert!(ledger.accounts().iter().all(|account| account.id() != a.id()));
}

#[test]
fn cascade_delete_is_a_single_commit() {
    let mut ledger = Ledger::in_memory();
    let a = add_account(&mut ledger, "A", "GBP", dec!(50));
    for day in 0..4 {
        add_transaction(&mut ledger, &a, dec!(1), "Tick", day);
    }
    let commits_before = ledger.gateway().commit_count();

    AccountService::remove(&mut ledger, a.id()).unwrap();

    assert_eq!(ledger.gateway().commit_count(), commits_before + 1);
}

#[test]
fn failed_cascade_commit_leaves_everything_in_place() {
    let mut ledger = Ledger::in_memory();
    let a = add_account(&mut ledger, "A", "GBP", dec!(50));
    let first = add_transaction(&mut ledger, &a, dec!(-5), "Coffee", 0);
    let second = add_transaction(&mut ledger, &a, dec!(20), "Gift", 1);

    ledger.gateway_mut().fail_next_commit("storage unavailable");
    let err = AccountService::remove(&mut ledger, a.id()).unwrap_err();

    assert!(matches!(err, LedgerError::Persistence(_)));
    assert!(err.is_retryable());
    assert!(ledger.account(a.id()).is_some());
    assert!(ledger.transaction(first).is_some());
    assert!(ledger.transaction(second).is_some());
    assert_eq!(ledger.gateway().committed().transaction_count(), 2);
    assert!(!ledger.gateway().is_dirty());

    AccountService::remove(&mut ledger, a.id()).expect("retry succeeds");
    assert_eq!(ledger.transaction_count(), 0);
}

#[test]
fn deleting_transactions_leaves_account_balance_consistent() {
    let mut ledger = Ledger::in_memory();
    let a = add_account(&mut ledger, "A", "EUR", dec!(100));
    let keep = add_transaction(&mut ledger, &a, dec!(-30), "Keep", 0);
    let drop = add_transaction(&mut ledger, &a, dec!(-50), "Drop", 1);

    TransactionService::remove_many(&mut ledger, &HashSet::from([drop])).unwrap();

    assert!(ledger.transaction(keep).is_some());
    assert!(ledger.transaction(drop).is_none());
    assert_eq!(
        SummaryService::current_balance(&ledger, a.id()).unwrap(),
        dec!(70)
    );
}

#[test]
fn construction_rejects_invalid_values() {
    assert_eq!(
        Account::new("   ", "GBP", dec!(0), "img"),
        Err(ValidationError::EmptyName)
    );
    assert_eq!(
        Account::new("Cash", "GBP", dec!(-1), "img"),
        Err(ValidationError::NegativeStartingBalance(dec!(-1)))
    );
    assert_eq!(
        Account::new("Cash", "GB", dec!(0), "img"),
        Err(ValidationError::InvalidCurrencyCode("GB".into()))
    );

    let account = Account::new("Cash", "GBP", dec!(0), "img").unwrap();
    assert_eq!(
        AccountTransaction::new(dec!(0), common::base_date(), "Nothing", &account),
        Err(ValidationError::ZeroAmount)
    );
    assert_eq!(
        AccountTransaction::new(dec!(5), common::base_date(), "", &account),
        Err(ValidationError::EmptyTitle)
    );
}

#[test]
fn editing_account_with_history_is_flagged_but_allowed() {
    let mut ledger = Ledger::in_memory();
    let a = add_account(&mut ledger, "A", "GBP", dec!(100));
    add_transaction(&mut ledger, &a, dec!(-25), "Bill", 0);
    let changes = AccountChanges::new().currency_code("EUR");

    assert!(AccountService::edit_needs_confirmation(&ledger, a.id(), &changes).unwrap());
    AccountService::edit(&mut ledger, a.id(), changes).unwrap();

    let txn = &ledger.transactions_for(a.id())[0];
    assert_eq!(txn.amount(), dec!(-25));
    assert_eq!(ledger.currency_of(txn.id()).unwrap().as_str(), "EUR");
    assert_eq!(
        SummaryService::current_balance(&ledger, a.id()).unwrap(),
        dec!(75)
    );
}

#[test]
fn failed_edit_commit_keeps_previous_values() {
    let mut ledger = Ledger::in_memory();
    let a = add_account(&mut ledger, "A", "GBP", dec!(100));

    ledger.gateway_mut().fail_next_commit("locked");
    let err = AccountService::edit(&mut ledger, a.id(), AccountChanges::new().name("Renamed"))
        .unwrap_err();

    assert!(matches!(err, LedgerError::Persistence(_)));
    assert_eq!(ledger.account(a.id()).unwrap().name(), "A");
}

#[test]
fn extreme_balances_report_errors_instead_of_panicking() {
    let mut ledger = Ledger::in_memory();
    let vault = add_account(&mut ledger, "Vault", "GBP", rust_decimal::Decimal::MAX);
    add_transaction(&mut ledger, &vault, dec!(1), "Interest", 0);

    assert!(matches!(
        SummaryService::current_balance(&ledger, vault.id()),
        Err(LedgerError::BalanceOverflow(_))
    ));
    let wealth = SummaryService::total_wealth(&ledger, FxTable::standard(), Currency::USD);
    assert_eq!(wealth.total, dec!(0));
    assert_eq!(wealth.skipped, vec![vault.id()]);
}

#![doc(test(attr(deny(warnings))))]

//! Lumin Core is the ledger engine behind a personal multi-currency money
//! tracker: accounts with starting balances, the transactions they own,
//! derived balances and total wealth in a chosen base currency.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod ledger;
pub mod settings;
pub mod storage;
pub mod utils;

pub use crate::core::services::{AccountService, SummaryService, TransactionService};
pub use crate::core::LedgerManager;
pub use currency::{Currency, CurrencyCode, FxTable};
pub use domain::{Account, AccountChanges, AccountTransaction, TransactionChanges, TransactionSign};
pub use errors::{LedgerError, Result};
pub use filter::TransactionFilter;
pub use ledger::Ledger;
pub use settings::Settings;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Lumin Core tracing initialized.");
    });
}

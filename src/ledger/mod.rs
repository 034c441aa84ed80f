//! The account/transaction aggregate and its read helpers.

#[allow(clippy::module_inception)]
pub mod ledger;

pub use ledger::Ledger;

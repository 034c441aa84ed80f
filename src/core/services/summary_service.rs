use rust_decimal::Decimal;
use uuid::Uuid;

use crate::currency::{Currency, CurrencyCode, FxTable};
use crate::domain::AccountTransaction;
use crate::errors::{ConversionWarning, LedgerError};
use crate::ledger::Ledger;
use crate::storage::PersistenceGateway;

use super::ServiceResult;

/// Derived balance for one account, in that account's currency.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub account_id: Uuid,
    pub name: String,
    pub currency_code: CurrencyCode,
    /// `None` when the balance does not fit in a `Decimal`.
    pub balance: Option<Decimal>,
}

/// Sum of every account balance expressed in one base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct WealthSummary {
    pub total: Decimal,
    pub currency: Currency,
    /// Accounts whose balance could not be converted; it was added unconverted.
    pub warnings: Vec<ConversionWarning>,
    /// Accounts left out because their balance, or the running total, went
    /// out of range.
    pub skipped: Vec<Uuid>,
}

pub struct SummaryService;

impl SummaryService {
    /// Starting balance plus every owned transaction amount.
    pub fn current_balance<G: PersistenceGateway>(
        ledger: &Ledger<G>,
        account_id: Uuid,
    ) -> ServiceResult<Decimal> {
        let account = ledger
            .account(account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        account
            .current_balance(ledger.owned_transactions(account_id))
            .ok_or(LedgerError::BalanceOverflow(account_id))
    }

    /// Balances for every account, ordered by account name.
    pub fn account_balances<G: PersistenceGateway>(ledger: &Ledger<G>) -> Vec<AccountBalance> {
        ledger
            .accounts()
            .into_iter()
            .map(|account| AccountBalance {
                account_id: account.id(),
                balance: account.current_balance(ledger.owned_transactions(account.id())),
                name: account.name().to_string(),
                currency_code: account.currency_code().clone(),
            })
            .collect()
    }

    /// Converts each account balance into `base` and sums the results.
    ///
    /// A missing rate never aborts the sum: the balance is added unconverted
    /// and the warning is logged and reported in the summary.
    pub fn total_wealth<G: PersistenceGateway>(
        ledger: &Ledger<G>,
        fx: &FxTable,
        base: Currency,
    ) -> WealthSummary {
        let mut total = Decimal::ZERO;
        let mut warnings = Vec::new();
        let mut skipped = Vec::new();
        for entry in Self::account_balances(ledger) {
            let Some(balance) = entry.balance else {
                tracing::warn!(account = %entry.account_id, "balance out of range; skipping");
                skipped.push(entry.account_id);
                continue;
            };
            let contribution =
                match fx.try_convert(balance, entry.currency_code.as_str(), base.as_str()) {
                    Ok(converted) => converted,
                    Err(warning) => {
                        tracing::warn!(
                            account = %entry.account_id,
                            currency = %entry.currency_code,
                            "{warning}; adding balance unconverted"
                        );
                        warnings.push(warning);
                        balance
                    }
                };
            match total.checked_add(contribution) {
                Some(sum) => total = sum,
                None => {
                    tracing::warn!(account = %entry.account_id, "total out of range; skipping");
                    skipped.push(entry.account_id);
                }
            }
        }
        WealthSummary {
            total,
            currency: base,
            warnings,
            skipped,
        }
    }

    /// The `limit` newest transactions.
    pub fn recent_transactions<G: PersistenceGateway>(
        ledger: &Ledger<G>,
        limit: usize,
    ) -> Vec<AccountTransaction> {
        let mut transactions = ledger.transactions();
        transactions.truncate(limit);
        transactions
    }
}

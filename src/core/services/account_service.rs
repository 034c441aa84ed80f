//! Business logic helpers for validated account mutations.

use std::collections::HashSet;

use uuid::Uuid;

use crate::core::services::ServiceResult;
use crate::domain::{Account, AccountChanges};
use crate::errors::{IntegrityError, LedgerError};
use crate::ledger::Ledger;
use crate::storage::{Entity, EntityKey, PersistenceGateway};

/// Provides validated mutations for [`Account`] entities.
///
/// See also: [`crate::core::services::TransactionService`] for the owned side
/// of the relationship.
pub struct AccountService;

impl AccountService {
    /// Persists a freshly constructed account and returns its identifier.
    pub fn add<G: PersistenceGateway>(
        ledger: &mut Ledger<G>,
        account: Account,
    ) -> ServiceResult<Uuid> {
        account.validate()?;
        let id = account.id();
        let name = account.name().to_string();
        ledger.stage_insert(Entity::Account(account));
        ledger.commit("add account")?;
        tracing::info!(%id, name = %name, "account added");
        Ok(id)
    }

    /// Applies `changes` to the account identified by `id`.
    ///
    /// Validation runs before anything is staged. Changing the currency or
    /// starting balance of an account with transactions is allowed here; use
    /// [`AccountService::edit_needs_confirmation`] to decide whether to ask
    /// the user first.
    pub fn edit<G: PersistenceGateway>(
        ledger: &mut Ledger<G>,
        id: Uuid,
        changes: AccountChanges,
    ) -> ServiceResult<()> {
        let current = ledger.account(id).ok_or(LedgerError::AccountNotFound(id))?;
        let updated = changes.apply_to(current)?;
        if &updated == current {
            tracing::debug!(%id, "account edit is a no-op");
            return Ok(());
        }
        if changes.rewrites_history(current) && ledger.has_transactions(id) {
            tracing::warn!(%id, "editing currency or starting balance of an account with history");
        }
        ledger.stage_insert(Entity::Account(updated));
        ledger.commit("edit account")?;
        tracing::info!(%id, "account updated");
        Ok(())
    }

    /// Whether the account already owns transactions.
    pub fn has_transactions<G: PersistenceGateway>(ledger: &Ledger<G>, id: Uuid) -> bool {
        ledger.has_transactions(id)
    }

    /// True when `changes` would alter currency or starting balance of an
    /// account that already has transactions.
    pub fn edit_needs_confirmation<G: PersistenceGateway>(
        ledger: &Ledger<G>,
        id: Uuid,
        changes: &AccountChanges,
    ) -> ServiceResult<bool> {
        let current = ledger.account(id).ok_or(LedgerError::AccountNotFound(id))?;
        Ok(changes.rewrites_history(current) && ledger.has_transactions(id))
    }

    /// Deletes the account together with every transaction it owns, in a
    /// single commit. Returns the number of transactions removed.
    pub fn remove<G: PersistenceGateway>(ledger: &mut Ledger<G>, id: Uuid) -> ServiceResult<usize> {
        if ledger.account(id).is_none() {
            return Err(LedgerError::AccountNotFound(id));
        }
        let removed = stage_cascade(ledger, id)?;
        ledger.commit("delete account")?;
        tracing::info!(%id, transactions = removed, "account deleted");
        Ok(removed)
    }

    /// Deletes every account in `ids` and all the transactions they own in one
    /// commit. Fails without changes if any id is unknown. Returns the number
    /// of transactions removed.
    pub fn remove_many<G: PersistenceGateway>(
        ledger: &mut Ledger<G>,
        ids: &HashSet<Uuid>,
    ) -> ServiceResult<usize> {
        let mut ordered: Vec<Uuid> = ids.iter().copied().collect();
        ordered.sort();
        if let Some(missing) = ordered.iter().find(|id| ledger.account(**id).is_none()) {
            return Err(LedgerError::AccountNotFound(*missing));
        }
        let mut removed = 0;
        for id in &ordered {
            removed += stage_cascade(ledger, *id)?;
        }
        ledger.commit("delete accounts")?;
        tracing::info!(
            accounts = ordered.len(),
            transactions = removed,
            "accounts deleted"
        );
        Ok(removed)
    }

    /// Accounts ordered by name.
    pub fn list<G: PersistenceGateway>(ledger: &Ledger<G>) -> Vec<Account> {
        ledger.accounts()
    }
}

/// Stages the deletion of `id` and its owned transactions. Staged changes are
/// discarded if the account index still lists transactions afterwards.
fn stage_cascade<G: PersistenceGateway>(ledger: &mut Ledger<G>, id: Uuid) -> ServiceResult<usize> {
    let owned = ledger.gateway().transaction_ids_for(id);
    for txn_id in &owned {
        ledger.stage_delete(EntityKey::Transaction(*txn_id));
    }
    ledger.stage_delete(EntityKey::Account(id));

    let remaining = ledger.gateway().transaction_ids_for(id).len();
    if remaining > 0 {
        ledger.discard();
        return Err(IntegrityError::CascadeIncomplete {
            account: id,
            remaining,
        }
        .into());
    }
    Ok(owned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::TransactionService;
    use crate::domain::AccountTransaction;
    use crate::errors::ValidationError;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn ledger_with_account() -> (Ledger, Uuid) {
        let mut ledger = Ledger::in_memory();
        let account = Account::new("Checking", "GBP", dec!(100), "img").unwrap();
        let id = AccountService::add(&mut ledger, account).expect("add succeeds");
        (ledger, id)
    }

    #[test]
    fn edit_overwrites_account_fields() {
        let (mut ledger, id) = ledger_with_account();
        let changes = AccountChanges::new()
            .name(" Current ")
            .currency_code("usd")
            .starting_balance(dec!(25));

        AccountService::edit(&mut ledger, id, changes).expect("edit succeeds");

        let stored = ledger.account(id).expect("account exists");
        assert_eq!(stored.name(), "Current");
        assert_eq!(stored.currency_code().as_str(), "USD");
        assert_eq!(stored.starting_balance(), dec!(25));
    }

    #[test]
    fn invalid_edit_changes_nothing() {
        let (mut ledger, id) = ledger_with_account();
        let before = ledger.account(id).cloned();

        let err = AccountService::edit(&mut ledger, id, AccountChanges::new().name("  "))
            .expect_err("blank name must fail");

        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::EmptyName)
        ));
        assert_eq!(ledger.account(id).cloned(), before);
        assert!(!ledger.gateway().is_dirty());
    }

    #[test]
    fn confirmation_only_needed_with_history() {
        let (mut ledger, id) = ledger_with_account();
        let changes = AccountChanges::new().currency_code("EUR");
        assert!(!AccountService::edit_needs_confirmation(&ledger, id, &changes).unwrap());

        let account = ledger.account(id).cloned().unwrap();
        let txn = AccountTransaction::new(dec!(-10), Utc::now(), "Lunch", &account).unwrap();
        TransactionService::add(&mut ledger, txn).unwrap();

        assert!(AccountService::has_transactions(&ledger, id));
        assert!(AccountService::edit_needs_confirmation(&ledger, id, &changes).unwrap());
        assert!(!AccountService::edit_needs_confirmation(
            &ledger,
            id,
            &AccountChanges::new().name("Renamed")
        )
        .unwrap());
    }

    #[test]
    fn remove_unknown_account_fails() {
        let mut ledger = Ledger::in_memory();
        let missing = Uuid::new_v4();
        assert!(matches!(
            AccountService::remove(&mut ledger, missing),
            Err(LedgerError::AccountNotFound(id)) if id == missing
        ));
    }

    fn seed_three_accounts(ledger: &mut Ledger) -> (Uuid, Uuid, Uuid) {
        let a = Account::new("A", "GBP", dec!(10), "img").unwrap();
        let b = Account::new("B", "USD", dec!(20), "img").unwrap();
        let c = Account::new("C", "EUR", dec!(30), "img").unwrap();
        for account in [&a, &b, &c] {
            AccountService::add(ledger, account.clone()).unwrap();
            let txn = AccountTransaction::new(dec!(1), Utc::now(), "Fee", account).unwrap();
            TransactionService::add(ledger, txn).unwrap();
        }
        (a.id(), b.id(), c.id())
    }

    #[test]
    fn remove_many_cascades_in_one_commit() {
        let mut ledger = Ledger::in_memory();
        let (a, b, c) = seed_three_accounts(&mut ledger);
        let commits_before = ledger.gateway().commit_count();

        let removed = AccountService::remove_many(&mut ledger, &HashSet::from([a, b])).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(ledger.gateway().commit_count(), commits_before + 1);
        assert!(ledger.account(a).is_none());
        assert!(ledger.account(b).is_none());
        assert!(ledger.account(c).is_some());
        assert_eq!(ledger.transaction_count(), 1);
        assert!(ledger.has_transactions(c));
    }

    #[test]
    fn remove_many_with_unknown_id_changes_nothing() {
        let mut ledger = Ledger::in_memory();
        let (a, _, _) = seed_three_accounts(&mut ledger);
        let ghost = Uuid::new_v4();

        let err = AccountService::remove_many(&mut ledger, &HashSet::from([a, ghost]))
            .expect_err("unknown id must fail");

        assert!(matches!(err, LedgerError::AccountNotFound(id) if id == ghost));
        assert_eq!(ledger.account_count(), 3);
        assert_eq!(ledger.transaction_count(), 3);
        assert!(!ledger.gateway().is_dirty());
    }

    #[test]
    fn remove_many_failed_commit_keeps_every_account() {
        let mut ledger = Ledger::in_memory();
        let (a, b, _) = seed_three_accounts(&mut ledger);

        ledger.gateway_mut().fail_next_commit("disk full");
        let err = AccountService::remove_many(&mut ledger, &HashSet::from([a, b]))
            .expect_err("injected failure");

        assert!(matches!(err, LedgerError::Persistence(_)));
        assert_eq!(ledger.account_count(), 3);
        assert_eq!(ledger.transaction_count(), 3);
        assert!(ledger.has_transactions(a));
        assert!(ledger.has_transactions(b));

        AccountService::remove_many(&mut ledger, &HashSet::from([a, b])).expect("retry succeeds");
        assert_eq!(ledger.account_count(), 1);
    }
}

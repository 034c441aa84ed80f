//! Business logic helpers for managing transactions.

use std::collections::HashSet;

use uuid::Uuid;

use crate::core::services::ServiceResult;
use crate::domain::{AccountTransaction, TransactionChanges};
use crate::errors::{LedgerError, ValidationError};
use crate::filter::TransactionFilter;
use crate::ledger::Ledger;
use crate::storage::{Entity, EntityKey, PersistenceGateway};

/// Provides validated CRUD helpers for ledger transactions.
pub struct TransactionService;

impl TransactionService {
    /// Persists a new transaction after checking its owning account exists.
    pub fn add<G: PersistenceGateway>(
        ledger: &mut Ledger<G>,
        transaction: AccountTransaction,
    ) -> ServiceResult<Uuid> {
        transaction.validate()?;
        ensure_account(ledger, transaction.account_id())?;
        let id = transaction.id();
        ledger.stage_insert(Entity::Transaction(transaction));
        ledger.commit("add transaction")?;
        tracing::info!(%id, "transaction added");
        Ok(id)
    }

    /// Applies `changes` to the transaction identified by `id`. Moving it to
    /// another account changes its effective currency only; the stored amount
    /// is kept as given.
    pub fn edit<G: PersistenceGateway>(
        ledger: &mut Ledger<G>,
        id: Uuid,
        changes: TransactionChanges,
    ) -> ServiceResult<()> {
        let current = ledger
            .transaction(id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        let updated = changes.apply_to(current)?;
        if &updated == current {
            tracing::debug!(%id, "transaction edit is a no-op");
            return Ok(());
        }
        ensure_account(ledger, updated.account_id())?;
        ledger.stage_insert(Entity::Transaction(updated));
        ledger.commit("edit transaction")?;
        tracing::info!(%id, "transaction updated");
        Ok(())
    }

    /// Removes every transaction in `ids` in one commit. Owning accounts are
    /// untouched. Fails without changes if any id is unknown.
    pub fn remove_many<G: PersistenceGateway>(
        ledger: &mut Ledger<G>,
        ids: &HashSet<Uuid>,
    ) -> ServiceResult<usize> {
        let mut ordered: Vec<Uuid> = ids.iter().copied().collect();
        ordered.sort();
        if let Some(missing) = ordered.iter().find(|id| ledger.transaction(**id).is_none()) {
            return Err(LedgerError::TransactionNotFound(*missing));
        }
        for id in &ordered {
            ledger.stage_delete(EntityKey::Transaction(*id));
        }
        ledger.commit("delete transactions")?;
        tracing::info!(count = ordered.len(), "transactions deleted");
        Ok(ordered.len())
    }

    /// Every transaction, newest first.
    pub fn list<G: PersistenceGateway>(ledger: &Ledger<G>) -> Vec<AccountTransaction> {
        ledger.transactions()
    }

    /// Transactions visible through `filter`, newest first.
    pub fn list_filtered<G: PersistenceGateway>(
        ledger: &Ledger<G>,
        filter: &TransactionFilter,
    ) -> Vec<AccountTransaction> {
        ledger.filtered_transactions(filter)
    }
}

fn ensure_account<G: PersistenceGateway>(ledger: &Ledger<G>, account_id: Uuid) -> ServiceResult<()> {
    if ledger.account(account_id).is_some() {
        Ok(())
    } else {
        Err(ValidationError::UnknownAccount(account_id).into())
    }
}

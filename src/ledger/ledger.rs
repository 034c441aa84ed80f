use uuid::Uuid;

use crate::{
    currency::CurrencyCode,
    domain::{Account, AccountTransaction},
    errors::{LedgerError, PersistenceFailure, Result},
    filter::TransactionFilter,
    storage::{Entity, EntityKey, FetchRequest, MemoryGateway, PersistenceGateway, SortKey},
};

/// The account/transaction aggregate.
///
/// Reads go straight to the gateway's working state. Writes are staged on the
/// gateway by the services in [`crate::core::services`] and made durable by
/// [`Ledger::commit`], which rolls the staged changes back when the gateway
/// refuses them.
#[derive(Debug)]
pub struct Ledger<G: PersistenceGateway = MemoryGateway> {
    gateway: G,
}

impl Ledger<MemoryGateway> {
    pub fn in_memory() -> Self {
        Self::new(MemoryGateway::new())
    }
}

impl Default for Ledger<MemoryGateway> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<G: PersistenceGateway> Ledger<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.gateway.account(id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&AccountTransaction> {
        self.gateway.transaction(id)
    }

    /// Accounts ordered by name.
    pub fn accounts(&self) -> Vec<Account> {
        self.gateway
            .fetch(&FetchRequest::accounts().sorted_by(SortKey::AccountName))
            .into_iter()
            .filter_map(Entity::into_account)
            .collect()
    }

    /// Every transaction, newest first.
    pub fn transactions(&self) -> Vec<AccountTransaction> {
        self.gateway
            .fetch(&FetchRequest::transactions().sorted_by(SortKey::DateNewestFirst))
            .into_iter()
            .filter_map(Entity::into_transaction)
            .collect()
    }

    /// Transactions whose owning account passes `filter`, newest first.
    pub fn filtered_transactions(&self, filter: &TransactionFilter) -> Vec<AccountTransaction> {
        let predicate = |entity: &Entity| match entity {
            Entity::Transaction(txn) => filter.includes(txn.account_id()),
            Entity::Account(_) => false,
        };
        self.gateway
            .fetch(
                &FetchRequest::transactions()
                    .matching(&predicate)
                    .sorted_by(SortKey::DateNewestFirst),
            )
            .into_iter()
            .filter_map(Entity::into_transaction)
            .collect()
    }

    /// Transactions owned by `account_id`, resolved through the account index.
    pub fn owned_transactions(&self, account_id: Uuid) -> Vec<&AccountTransaction> {
        self.gateway
            .transaction_ids_for(account_id)
            .into_iter()
            .filter_map(|id| self.gateway.transaction(id))
            .collect()
    }

    /// Owned transactions, newest first.
    pub fn transactions_for(&self, account_id: Uuid) -> Vec<AccountTransaction> {
        let mut owned: Vec<AccountTransaction> = self
            .owned_transactions(account_id)
            .into_iter()
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.id().cmp(&b.id())));
        owned
    }

    pub fn has_transactions(&self, account_id: Uuid) -> bool {
        !self.gateway.transaction_ids_for(account_id).is_empty()
    }

    /// Effective currency of a transaction, read through its owning account.
    pub fn currency_of(&self, transaction_id: Uuid) -> Option<&CurrencyCode> {
        let txn = self.gateway.transaction(transaction_id)?;
        self.gateway
            .account(txn.account_id())
            .map(Account::currency_code)
    }

    pub fn account_count(&self) -> usize {
        self.gateway.fetch(&FetchRequest::accounts()).len()
    }

    pub fn transaction_count(&self) -> usize {
        self.gateway.fetch(&FetchRequest::transactions()).len()
    }

    pub(crate) fn stage_insert(&mut self, entity: Entity) {
        tracing::debug!(id = %entity.id(), kind = ?entity.kind(), "staging insert");
        self.gateway.insert(entity);
    }

    pub(crate) fn stage_delete(&mut self, key: EntityKey) {
        tracing::debug!(?key, "staging delete");
        self.gateway.delete(key);
    }

    /// Discards staged changes without committing.
    pub fn discard(&mut self) {
        if self.gateway.is_dirty() {
            tracing::warn!("discarding staged ledger changes");
        }
        self.gateway.rollback();
    }

    /// Commits everything staged so far. On failure the staged changes are
    /// discarded so the ledger reads as the last committed state.
    pub fn commit(&mut self, operation: &str) -> Result<()> {
        match self.gateway.commit() {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(operation, error = %err, "commit failed; rolling back");
                self.gateway.rollback();
                Err(match err {
                    PersistenceFailure::Integrity(integrity) => LedgerError::Integrity(integrity),
                    other => LedgerError::Persistence(other),
                })
            }
        }
    }

    /// Removes every transaction and then every account in one commit.
    pub fn reset(&mut self) -> Result<()> {
        let transaction_ids: Vec<Uuid> = self
            .gateway
            .fetch(&FetchRequest::transactions())
            .iter()
            .map(Entity::id)
            .collect();
        let account_ids: Vec<Uuid> = self
            .gateway
            .fetch(&FetchRequest::accounts())
            .iter()
            .map(Entity::id)
            .collect();
        for id in &transaction_ids {
            self.stage_delete(EntityKey::Transaction(*id));
        }
        for id in &account_ids {
            self.stage_delete(EntityKey::Account(*id));
        }
        self.commit("reset")?;
        tracing::info!(
            accounts = account_ids.len(),
            transactions = transaction_ids.len(),
            "ledger reset"
        );
        Ok(())
    }
}

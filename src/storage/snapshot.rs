use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{Account, AccountTransaction},
    errors::{IntegrityError, PersistenceFailure, ValidationError},
};

use super::{Entity, EntityKey, EntityKind, FetchRequest, SortKey};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Entity tables plus the account → transactions index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<Uuid, AccountTransaction>,
    by_account: HashMap<Uuid, BTreeSet<Uuid>>,
}

impl LedgerSnapshot {
    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&AccountTransaction> {
        self.transactions.get(&id)
    }

    pub fn transaction_ids_for(&self, account_id: Uuid) -> Vec<Uuid> {
        self.by_account
            .get(&account_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn insert(&mut self, entity: Entity) {
        match entity {
            Entity::Account(account) => {
                self.accounts.insert(account.id(), account);
            }
            Entity::Transaction(txn) => {
                if let Some(previous) = self.transactions.get(&txn.id()) {
                    let previous_owner = previous.account_id();
                    self.unindex(previous_owner, txn.id());
                }
                self.by_account
                    .entry(txn.account_id())
                    .or_default()
                    .insert(txn.id());
                self.transactions.insert(txn.id(), txn);
            }
        }
    }

    pub fn remove(&mut self, key: EntityKey) -> bool {
        match key {
            EntityKey::Account(id) => self.accounts.remove(&id).is_some(),
            EntityKey::Transaction(id) => match self.transactions.remove(&id) {
                Some(txn) => {
                    self.unindex(txn.account_id(), id);
                    true
                }
                None => false,
            },
        }
    }

    fn unindex(&mut self, account_id: Uuid, txn_id: Uuid) {
        if let Some(ids) = self.by_account.get_mut(&account_id) {
            ids.remove(&txn_id);
            if ids.is_empty() {
                self.by_account.remove(&account_id);
            }
        }
    }

    pub fn fetch(&self, request: &FetchRequest<'_>) -> Vec<Entity> {
        let mut rows: Vec<Entity> = match request.kind {
            EntityKind::Account => self
                .accounts
                .values()
                .cloned()
                .map(Entity::Account)
                .collect(),
            EntityKind::Transaction => self
                .transactions
                .values()
                .cloned()
                .map(Entity::Transaction)
                .collect(),
        };
        if let Some(predicate) = request.predicate {
            rows.retain(|entity| predicate(entity));
        }
        match request.sort {
            Some(key) => rows.sort_by(|a, b| key.compare(a, b)),
            None => rows.sort_by_key(Entity::id),
        }
        rows
    }

    /// Every transaction must point at an account present in the same snapshot.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let mut orphans: Vec<&AccountTransaction> = self
            .transactions
            .values()
            .filter(|txn| !self.accounts.contains_key(&txn.account_id()))
            .collect();
        orphans.sort_by_key(|txn| txn.id());
        match orphans.first() {
            Some(txn) => Err(IntegrityError::OrphanedTransaction {
                transaction: txn.id(),
                account: txn.account_id(),
            }),
            None => Ok(()),
        }
    }

    pub fn to_file(&self) -> SnapshotFile {
        let mut accounts: Vec<Account> = self.accounts.values().cloned().collect();
        accounts.sort_by_key(Account::id);
        let mut transactions: Vec<AccountTransaction> =
            self.transactions.values().cloned().collect();
        transactions.sort_by_key(AccountTransaction::id);
        SnapshotFile {
            schema_version: CURRENT_SCHEMA_VERSION,
            accounts,
            transactions,
        }
    }

    /// Rebuilds a snapshot from disk, re-running entity validation and the
    /// referential integrity check.
    pub fn from_file(file: SnapshotFile) -> Result<Self, PersistenceFailure> {
        if file.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(PersistenceFailure::Rejected(format!(
                "unsupported schema version {}",
                file.schema_version
            )));
        }
        let mut snapshot = Self::default();
        for account in file.accounts {
            account.validate().map_err(invalid_record)?;
            snapshot.insert(Entity::Account(account));
        }
        for txn in file.transactions {
            txn.validate().map_err(invalid_record)?;
            snapshot.insert(Entity::Transaction(txn));
        }
        snapshot.check_integrity()?;
        Ok(snapshot)
    }
}

fn invalid_record(err: ValidationError) -> PersistenceFailure {
    PersistenceFailure::Rejected(format!("stored record is invalid: {err}"))
}

/// On-disk representation; the index is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub schema_version: u8,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<AccountTransaction>,
}

/// Last committed state plus a working copy holding staged changes.
#[derive(Debug, Clone, Default)]
pub struct StagedSnapshot {
    committed: LedgerSnapshot,
    working: LedgerSnapshot,
    dirty: bool,
}

impl StagedSnapshot {
    pub fn from_committed(committed: LedgerSnapshot) -> Self {
        Self {
            working: committed.clone(),
            committed,
            dirty: false,
        }
    }

    pub fn working(&self) -> &LedgerSnapshot {
        &self.working
    }

    pub fn committed(&self) -> &LedgerSnapshot {
        &self.committed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn insert(&mut self, entity: Entity) {
        self.working.insert(entity);
        self.dirty = true;
    }

    pub fn delete(&mut self, key: EntityKey) {
        if self.working.remove(key) {
            self.dirty = true;
        }
    }

    /// Promotes the working copy once `persist` has durably written it.
    pub fn commit_with<F>(&mut self, persist: F) -> Result<(), PersistenceFailure>
    where
        F: FnOnce(&LedgerSnapshot) -> Result<(), PersistenceFailure>,
    {
        if !self.dirty {
            return Ok(());
        }
        self.working.check_integrity()?;
        persist(&self.working)?;
        self.committed = self.working.clone();
        self.dirty = false;
        Ok(())
    }

    pub fn rollback(&mut self) {
        self.working = self.committed.clone();
        self.dirty = false;
    }
}

impl SortKey {
    fn compare(&self, a: &Entity, b: &Entity) -> std::cmp::Ordering {
        match (self, a, b) {
            (SortKey::AccountName, Entity::Account(a), Entity::Account(b)) => a
                .name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.id().cmp(&b.id())),
            (SortKey::DateNewestFirst, Entity::Transaction(a), Entity::Transaction(b)) => b
                .date()
                .cmp(&a.date())
                .then_with(|| a.id().cmp(&b.id())),
            (SortKey::DateOldestFirst, Entity::Transaction(a), Entity::Transaction(b)) => a
                .date()
                .cmp(&b.date())
                .then_with(|| a.id().cmp(&b.id())),
            _ => a.id().cmp(&b.id()),
        }
    }
}

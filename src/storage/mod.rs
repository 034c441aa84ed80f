//! Persistence gateway boundary.
//!
//! The ledger never writes anything itself: it stages inserts and deletes on a
//! [`PersistenceGateway`] and then asks for a single atomic `commit`.

pub mod json_backend;
pub mod memory;
pub mod snapshot;

use uuid::Uuid;

use crate::{
    domain::{Account, AccountTransaction},
    errors::PersistenceFailure,
};

pub use json_backend::JsonGateway;
pub use memory::MemoryGateway;
pub use snapshot::{LedgerSnapshot, SnapshotFile, StagedSnapshot, CURRENT_SCHEMA_VERSION};

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Account(Account),
    Transaction(AccountTransaction),
}

impl Entity {
    pub fn id(&self) -> Uuid {
        match self {
            Entity::Account(account) => account.id(),
            Entity::Transaction(txn) => txn.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Account(_) => EntityKind::Account,
            Entity::Transaction(_) => EntityKind::Transaction,
        }
    }

    pub fn key(&self) -> EntityKey {
        match self {
            Entity::Account(account) => EntityKey::Account(account.id()),
            Entity::Transaction(txn) => EntityKey::Transaction(txn.id()),
        }
    }

    pub fn into_account(self) -> Option<Account> {
        match self {
            Entity::Account(account) => Some(account),
            Entity::Transaction(_) => None,
        }
    }

    pub fn into_transaction(self) -> Option<AccountTransaction> {
        match self {
            Entity::Transaction(txn) => Some(txn),
            Entity::Account(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Account,
    Transaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Account(Uuid),
    Transaction(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    AccountName,
    DateNewestFirst,
    DateOldestFirst,
}

/// Query over one entity table with optional predicate and ordering.
/// Without a sort key rows come back ordered by id.
#[derive(Clone, Copy)]
pub struct FetchRequest<'a> {
    pub kind: EntityKind,
    pub predicate: Option<&'a dyn Fn(&Entity) -> bool>,
    pub sort: Option<SortKey>,
}

impl<'a> FetchRequest<'a> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            predicate: None,
            sort: None,
        }
    }

    pub fn accounts() -> Self {
        Self::new(EntityKind::Account)
    }

    pub fn transactions() -> Self {
        Self::new(EntityKind::Transaction)
    }

    pub fn matching(mut self, predicate: &'a dyn Fn(&Entity) -> bool) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }
}

/// Abstraction over persistence backends able to stage and atomically commit
/// ledger entities.
///
/// Implementations guarantee that `commit` either makes every staged change
/// durable or none of them, and that a failed commit leaves the staged
/// changes in place until `rollback` is called.
pub trait PersistenceGateway: Send {
    /// Stages an insert, replacing any entity with the same id.
    fn insert(&mut self, entity: Entity);
    fn delete(&mut self, key: EntityKey);
    /// Reads the working state, staged changes included.
    fn fetch(&self, request: &FetchRequest<'_>) -> Vec<Entity>;
    fn commit(&mut self) -> Result<(), PersistenceFailure>;
    /// Discards staged changes, restoring the last committed state.
    fn rollback(&mut self);
    fn is_dirty(&self) -> bool;

    fn account(&self, id: Uuid) -> Option<&Account>;
    fn transaction(&self, id: Uuid) -> Option<&AccountTransaction>;
    /// Index lookup keyed on the owning account.
    fn transaction_ids_for(&self, account_id: Uuid) -> Vec<Uuid>;
}

use uuid::Uuid;

use crate::{
    domain::{Account, AccountTransaction},
    errors::PersistenceFailure,
};

use super::{Entity, EntityKey, FetchRequest, LedgerSnapshot, PersistenceGateway, StagedSnapshot};

/// In-process gateway. Commits never touch disk; a failure can be injected for
/// the next commit to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: StagedSnapshot,
    fail_next_commit: Option<String>,
    commits: usize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            state: StagedSnapshot::from_committed(snapshot),
            ..Self::default()
        }
    }

    /// Makes the next `commit` fail with `reason` without applying anything.
    pub fn fail_next_commit(&mut self, reason: impl Into<String>) {
        self.fail_next_commit = Some(reason.into());
    }

    /// Number of successful commits that wrote changes.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub fn committed(&self) -> &LedgerSnapshot {
        self.state.committed()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn insert(&mut self, entity: Entity) {
        self.state.insert(entity);
    }

    fn delete(&mut self, key: EntityKey) {
        self.state.delete(key);
    }

    fn fetch(&self, request: &FetchRequest<'_>) -> Vec<Entity> {
        self.state.working().fetch(request)
    }

    fn commit(&mut self) -> Result<(), PersistenceFailure> {
        if !self.state.is_dirty() {
            return Ok(());
        }
        let injected = &mut self.fail_next_commit;
        self.state.commit_with(|_| match injected.take() {
            Some(reason) => Err(PersistenceFailure::Rejected(reason)),
            None => Ok(()),
        })?;
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) {
        self.state.rollback();
    }

    fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    fn account(&self, id: Uuid) -> Option<&Account> {
        self.state.working().account(id)
    }

    fn transaction(&self, id: Uuid) -> Option<&AccountTransaction> {
        self.state.working().transaction(id)
    }

    fn transaction_ids_for(&self, account_id: Uuid) -> Vec<Uuid> {
        self.state.working().transaction_ids_for(account_id)
    }
}

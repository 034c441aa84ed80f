use std::{
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::{
    domain::{Account, AccountTransaction},
    errors::PersistenceFailure,
    utils::{paths, persistence},
};

use super::{
    Entity, EntityKey, FetchRequest, LedgerSnapshot, PersistenceGateway, SnapshotFile,
    StagedSnapshot,
};

/// Filesystem-backed gateway: every commit rewrites the whole snapshot as JSON
/// through a temporary file that is renamed over the target.
#[derive(Debug)]
pub struct JsonGateway {
    path: PathBuf,
    state: StagedSnapshot,
}

impl JsonGateway {
    /// Opens (or starts) the ledger stored at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceFailure> {
        let path = path.into();
        let committed = if path.exists() {
            load_snapshot_from_path(&path)?
        } else {
            LedgerSnapshot::default()
        };
        tracing::debug!(
            path = %path.display(),
            accounts = committed.account_count(),
            transactions = committed.transaction_count(),
            "opened ledger file"
        );
        Ok(Self {
            path,
            state: StagedSnapshot::from_committed(committed),
        })
    }

    /// Opens the ledger file inside `dir`.
    pub fn in_dir(dir: &Path) -> Result<Self, PersistenceFailure> {
        Self::open(dir.join(paths::LEDGER_FILE))
    }

    /// Opens the ledger under the application data directory.
    pub fn open_default() -> Result<Self, PersistenceFailure> {
        Self::open(paths::ledger_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceGateway for JsonGateway {
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
        let path = self.path.clone();
        self.state
            .commit_with(|snapshot| save_snapshot_to_path(snapshot, &path))
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

/// Writes a snapshot to disk atomically by staging to a temporary file.
pub fn save_snapshot_to_path(
    snapshot: &LedgerSnapshot,
    path: &Path,
) -> Result<(), PersistenceFailure> {
    let json = serde_json::to_string_pretty(&snapshot.to_file())?;
    persistence::write_atomic(path, &json)
}

/// Loads and validates a snapshot from the provided filesystem path.
pub fn load_snapshot_from_path(path: &Path) -> Result<LedgerSnapshot, PersistenceFailure> {
    let data = fs::read_to_string(path)?;
    let file: SnapshotFile = serde_json::from_str(&data)?;
    LedgerSnapshot::from_file(file)
}

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::AccountTransaction;

/// Account-based selection over transactions for a single viewing session.
///
/// An empty selection means "show everything", not "show nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    selected: HashSet<Uuid>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &HashSet<Uuid> {
        &self.selected
    }

    pub fn is_filtering(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn set_selected(&mut self, ids: HashSet<Uuid>) {
        self.selected = ids;
    }

    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = Uuid>,
    {
        self.selected = ids.into_iter().collect();
    }

    pub fn toggle(&mut self, id: Uuid) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn includes(&self, id: Uuid) -> bool {
        self.selected.is_empty() || self.selected.contains(&id)
    }

    /// Keeps the transactions whose owning account passes the filter.
    pub fn apply<'a, I>(&'a self, transactions: I) -> impl Iterator<Item = &'a AccountTransaction>
    where
        I: IntoIterator<Item = &'a AccountTransaction>,
        I::IntoIter: 'a,
    {
        transactions
            .into_iter()
            .filter(move |txn| self.includes(txn.account_id()))
    }
}

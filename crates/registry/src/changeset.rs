//! The changeset — the unit of commit into the registry (§4.9, §5).
//!
//! A changeset is totally ordered: within it, deletes logically precede
//! updates, which precede adds. `RegistryStore::apply` enforces that
//! ordering when it folds the changeset into its in-memory state, regardless
//! of the order fields were populated in.

use crate::types::{Deployment, SafeTransaction, Transaction};

#[derive(Debug, Clone, Default)]
pub struct EntityDiff<T> {
    pub adds: Vec<T>,
    pub updates: Vec<T>,
    pub deletes: Vec<String>,
}

impl<T> EntityDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Changeset {
    pub deployments: EntityDiff<Deployment>,
    pub transactions: EntityDiff<Transaction>,
    pub safe_transactions: EntityDiff<SafeTransaction>,
    /// alias name → deployment id. Deletes carry the alias name.
    pub aliases: EntityDiff<(String, String)>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty() && self.transactions.is_empty() && self.safe_transactions.is_empty() && self.aliases.is_empty()
    }
}

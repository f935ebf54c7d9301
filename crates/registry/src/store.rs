//! The registry store (C9): exclusive owner of persisted deployment,
//! transaction, and safe-transaction state under `.treb/` (§4.9).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::Address;
use parking_lot::RwLock;
use treb_common::fs::atomic_write;

use crate::changeset::Changeset;
use crate::error::{RegistryError, Result};
use crate::lock::RegistryLock;
use crate::types::{Deployment, DeploymentType, SafeTransaction, Transaction};

const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub namespace: Option<String>,
    pub chain: Option<u64>,
    pub contract: Option<String>,
    pub label: Option<String>,
    pub ty: Option<DeploymentType>,
    pub fork_only: bool,
    pub no_fork: bool,
    pub tag: Option<String>,
}

#[derive(Default)]
struct Indexes {
    by_address: HashMap<u64, HashMap<Address, String>>,
    by_name: HashMap<String, Vec<String>>,
    by_chain: HashMap<u64, Vec<String>>,
    by_namespace: HashMap<String, Vec<String>>,
}

#[derive(Default)]
struct State {
    deployments: HashMap<String, Deployment>,
    transactions: HashMap<String, Transaction>,
    safe_transactions: HashMap<String, SafeTransaction>,
    aliases: HashMap<String, String>,
    indexes: Indexes,
}

impl State {
    fn rebuild_indexes(&mut self) {
        let mut indexes = Indexes::default();
        for (id, deployment) in &self.deployments {
            indexes.by_address.entry(deployment.chain_id).or_default().insert(deployment.address, id.clone());
            indexes.by_name.entry(deployment.contract_name.clone()).or_default().push(id.clone());
            indexes.by_chain.entry(deployment.chain_id).or_default().push(id.clone());
            indexes.by_namespace.entry(deployment.namespace.clone()).or_default().push(id.clone());
        }
        self.indexes = indexes;
    }
}

/// Holds the in-memory snapshot plus the path to `.treb/` on disk.
/// Single-writer: `apply` takes the cross-process lock for its whole
/// sequence; readers take the in-memory `RwLock` read guard.
pub struct RegistryStore {
    dir: PathBuf,
    state: RwLock<State>,
    pub last_applied: RwLock<Option<Changeset>>,
}

fn file_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

fn load_map<T: serde::de::DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn load_state(dir: &Path) -> Result<State> {
    let mut state = State {
        deployments: load_map(&file_path(dir, "deployments.json"))?,
        transactions: load_map(&file_path(dir, "transactions.json"))?,
        safe_transactions: load_map(&file_path(dir, "safe-transactions.json"))?,
        aliases: load_map(&file_path(dir, "aliases.json"))?,
        indexes: Indexes::default(),
    };
    state.rebuild_indexes();
    Ok(state)
}

impl RegistryStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        treb_common::fs::clean_stale_tmp_files(&dir)?;
        let state = load_state(&dir)?;

        Ok(Self { dir, state: RwLock::new(state), last_applied: RwLock::new(None) })
    }

    /// Validates, applies, and persists `changeset` under the cross-process
    /// lock (§4.9 apply semantics 1-4). Deletes are folded before updates,
    /// before adds, matching §5's total-order guarantee.
    ///
    /// The on-disk files are re-read after the lock is acquired rather than
    /// trusting the in-memory snapshot from `open()`: a second process racing
    /// for the lock would otherwise validate and persist against a state that
    /// predates whatever the first process just committed, silently
    /// reverting it.
    pub fn apply(&self, changeset: Changeset) -> Result<()> {
        let lock = RegistryLock::acquire(&file_path(&self.dir, ".lock"), LOCK_TIMEOUT)?;

        let mut state = load_state(&self.dir)?;
        self.validate(&state, &changeset)?;

        for id in &changeset.deployments.deletes {
            state.deployments.remove(id);
        }
        for id in &changeset.transactions.deletes {
            state.transactions.remove(id);
        }
        for id in &changeset.safe_transactions.deletes {
            state.safe_transactions.remove(id);
        }
        for (alias, _) in &changeset.aliases.deletes {
            state.aliases.remove(alias);
        }

        for deployment in changeset.deployments.updates.iter().chain(&changeset.deployments.adds) {
            state.deployments.insert(deployment.id(), deployment.clone());
        }
        for tx in changeset.transactions.updates.iter().chain(&changeset.transactions.adds) {
            state.transactions.insert(tx.id(), tx.clone());
        }
        for safe_tx in changeset.safe_transactions.updates.iter().chain(&changeset.safe_transactions.adds) {
            state.safe_transactions.insert(safe_tx.id(), safe_tx.clone());
        }
        for (alias, deployment_id) in changeset.aliases.updates.iter().chain(&changeset.aliases.adds) {
            state.aliases.insert(alias.clone(), deployment_id.clone());
        }

        state.rebuild_indexes();
        self.persist(&state)?;
        *self.state.write() = state;

        drop(lock);
        *self.last_applied.write() = Some(changeset);
        Ok(())
    }

    /// §4.9 apply rule 1: no delete of a deployment still referenced by a
    /// non-deleted proxy; no update/add of a proxy whose implementation id
    /// is absent from the post-apply set.
    fn validate(&self, state: &State, changeset: &Changeset) -> Result<()> {
        let deleted: std::collections::HashSet<&String> = changeset.deployments.deletes.iter().collect();

        let mut post_apply: HashMap<String, &Deployment> =
            state.deployments.iter().filter(|(id, _)| !deleted.contains(id)).map(|(id, d)| (id.clone(), d)).collect();
        for deployment in changeset.deployments.updates.iter().chain(&changeset.deployments.adds) {
            post_apply.insert(deployment.id(), deployment);
        }

        for deployment in post_apply.values() {
            if let Some(proxy_info) = &deployment.proxy_info {
                if !post_apply.contains_key(&proxy_info.implementation_deployment_id) {
                    return Err(RegistryError::Inconsistent(format!(
                        "deployment {} references missing implementation {}",
                        deployment.id(),
                        proxy_info.implementation_deployment_id
                    )));
                }
            }
        }

        for deleted_id in &changeset.deployments.deletes {
            for deployment in post_apply.values() {
                if let Some(proxy_info) = &deployment.proxy_info {
                    if &proxy_info.implementation_deployment_id == deleted_id {
                        return Err(RegistryError::Inconsistent(format!("cannot delete {deleted_id}: still referenced by proxy {}", deployment.id())));
                    }
                }
            }
        }

        Ok(())
    }

    /// Writes files in the safe-tx → tx → deployment → aliases order so a
    /// crash mid-sequence never leaves a dangling cross-file reference.
    fn persist(&self, state: &State) -> Result<()> {
        atomic_write(&file_path(&self.dir, "safe-transactions.json"), serde_json::to_string_pretty(&state.safe_transactions)?.as_bytes())?;
        atomic_write(&file_path(&self.dir, "transactions.json"), serde_json::to_string_pretty(&state.transactions)?.as_bytes())?;
        atomic_write(&file_path(&self.dir, "deployments.json"), serde_json::to_string_pretty(&state.deployments)?.as_bytes())?;
        atomic_write(&file_path(&self.dir, "aliases.json"), serde_json::to_string_pretty(&state.aliases)?.as_bytes())?;
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Option<Deployment> {
        self.state.read().deployments.get(id).cloned()
    }

    /// Case-insensitive address lookup: tries the literal bytes, which are
    /// canonical regardless of the string case the caller used to get them.
    pub fn get_by_address(&self, chain: u64, addr: Address) -> Option<Deployment> {
        let state = self.state.read();
        let id = state.indexes.by_address.get(&chain)?.get(&addr)?;
        state.deployments.get(id).cloned()
    }

    pub fn resolve_alias(&self, alias: &str) -> Option<String> {
        self.state.read().aliases.get(alias).cloned()
    }

    pub fn list(&self, filter: &ListFilter) -> Vec<Deployment> {
        self.state
            .read()
            .deployments
            .values()
            .filter(|d| filter.namespace.as_deref().map_or(true, |ns| ns == d.namespace))
            .filter(|d| filter.chain.map_or(true, |chain| chain == d.chain_id))
            .filter(|d| filter.contract.as_deref().map_or(true, |name| name == d.contract_name))
            .filter(|d| filter.label.as_deref().map_or(true, |label| label == d.label))
            .filter(|d| filter.ty.map_or(true, |ty| ty == d.ty))
            .filter(|d| !filter.fork_only || d.fork)
            .filter(|d| !filter.no_fork || !d.fork)
            .filter(|d| filter.tag.as_deref().map_or(true, |tag| d.tags.contains(tag)))
            .cloned()
            .collect()
    }

    pub fn namespaces_summary(&self) -> HashMap<String, usize> {
        let state = self.state.read();
        let mut summary = HashMap::new();
        for deployment in state.deployments.values() {
            *summary.entry(deployment.namespace.clone()).or_insert(0usize) += 1;
        }
        summary
    }

    /// Builds a delete-only changeset for every deployment (and its aliases)
    /// in `namespace`×`chain`; does not apply it.
    pub fn reset(&self, namespace: &str, chain: u64) -> Changeset {
        let state = self.state.read();
        let mut changeset = Changeset::default();
        for (id, deployment) in &state.deployments {
            if deployment.namespace == namespace && deployment.chain_id == chain {
                changeset.deployments.deletes.push(id.clone());
            }
        }
        for (alias, target) in &state.aliases {
            if changeset.deployments.deletes.contains(target) {
                changeset.aliases.deletes.push((alias.clone(), target.clone()));
            }
        }
        changeset
    }
}

//! C8 — combines the aggregated `ScriptExecution` with the indexer and ABI
//! registry to build the registry's changeset (§4.8).

use std::path::Path;

use sha2::{Digest, Sha256};
use treb_abi::AbiRegistry;
use treb_common::Vcs;
use treb_indexer::Indexer;
use treb_registry::{Changeset, Deployment, DeploymentInfo, DeploymentStatus, ProxyInfo, ProxyKind, Transaction, VerificationStatus};

use crate::aggregate::{PendingDeployment, ScriptExecution};

pub struct ResultParser<'a> {
    pub indexer: &'a Indexer,
    pub abi_registry: &'a AbiRegistry,
    pub vcs: &'a dyn Vcs,
    pub project_root: &'a Path,
}

impl<'a> ResultParser<'a> {
    pub fn new(indexer: &'a Indexer, abi_registry: &'a AbiRegistry, vcs: &'a dyn Vcs, project_root: &'a Path) -> Self {
        Self { indexer, abi_registry, vcs, project_root }
    }

    /// Builds an add-only changeset for a single script execution: one
    /// `Deployment` per contract created, one `Transaction` per aggregate,
    /// proxy linkage applied on top, and every new address's ABI registered
    /// for later decoding.
    pub fn parse(&self, execution: &ScriptExecution, namespace: &str, script_path: &str, chain_id: u64) -> Changeset {
        let source_commit = self.vcs.current_commit(self.project_root);
        let mut changeset = Changeset::default();

        for (&proxy_addr, relationship) in &execution.proxy_relationships {
            self.abi_registry.register_proxy(proxy_addr, relationship.implementation);
        }

        let mut deployment_ids: std::collections::HashMap<alloy_primitives::Address, String> = std::collections::HashMap::new();

        for pending in &execution.deployments {
            let deployment = self.build_deployment(pending, namespace, script_path, chain_id, source_commit.as_deref());
            deployment_ids.insert(pending.address, deployment.id());
            changeset.deployments.adds.push(deployment);
        }

        // Second pass: now that every id is known, wire in proxy_info using
        // the implementation's freshly-minted deployment id where available.
        for deployment in &mut changeset.deployments.adds {
            if let Some(relationship) = execution.proxy_relationships.get(&deployment.address) {
                if let Some(impl_id) = deployment_ids.get(&relationship.implementation) {
                    deployment.ty = treb_registry::DeploymentType::Proxy;
                    deployment.proxy_info =
                        Some(ProxyInfo { implementation_deployment_id: impl_id.clone(), admin_address: relationship.admin, proxy_kind: ProxyKind::Erc1967 });
                }
            }
        }

        for tx in &execution.transactions {
            changeset.transactions.adds.push(Transaction {
                chain_id,
                sender: tx.sender.unwrap_or_default(),
                to: tx.to,
                value: tx.value,
                calldata: tx.calldata.clone(),
                return_data: Default::default(),
                status: tx.status.unwrap_or(treb_registry::TransactionStatus::Simulated),
                block_number: tx.block_number,
                gas_used: tx.gas_used,
                tx_hash: tx.tx_hash,
                nonce: None,
                safe_tx_hash: tx.safe_tx_hash,
                deployments: tx.deployments.iter().filter_map(|d| deployment_ids.get(&d.address).cloned()).collect(),
            });
        }

        changeset
    }

    fn build_deployment(&self, pending: &PendingDeployment, namespace: &str, script_path: &str, chain_id: u64, source_commit: Option<&str>) -> Deployment {
        let record = self.indexer.get_by_name(&pending.contract_name).ok().and_then(|mut v| if v.len() == 1 { Some(v.remove(0)) } else { None });
        let artifact = record.as_ref().and_then(|r| r.artifact.clone());

        if let Some(artifact) = &artifact {
            self.abi_registry.register_artifact(pending.address, pending.contract_name.clone(), artifact);
        }

        let constructor_args = pending.constructor_args.clone().unwrap_or_default();
        let init_code_hash = compute_init_code_hash(artifact.as_ref(), &constructor_args);

        Deployment {
            address: pending.address,
            contract_name: pending.contract_name.clone(),
            label: String::new(),
            namespace: namespace.to_string(),
            chain_id,
            ty: pending.deployment_type,
            salt: pending.salt.unwrap_or_default(),
            init_code_hash,
            constructor_args,
            artifact_path: pending.artifact_path.clone().or_else(|| record.as_ref().map(|r| format!("{}:{}", r.source_path.display(), r.name))).unwrap_or_default(),
            source_hash: artifact.as_ref().and_then(|a| a.source_hash()),
            compiler_version: artifact.as_ref().and_then(|a| a.compiler_version()).map(str::to_string),
            script_path: Some(script_path.to_string()),
            tags: Default::default(),
            verification_status: VerificationStatus::Pending,
            proxy_info: None,
            deployment_info: DeploymentInfo {
                block_number: None,
                timestamp: None,
                tx_hash: None,
                safe_tx_hash: None,
                deployer_address: Default::default(),
                safe_address: None,
                safe_nonce: None,
                status: DeploymentStatus::Pending,
            },
            fork: false,
        }
        .with_source_commit(source_commit)
    }
}

/// §4.8: `sha256(init_code_bytes)`, distinct from the artifact's own
/// keccak-based `bytecode_hash` — this one binds the constructor arguments
/// actually used for this deployment.
fn compute_init_code_hash(artifact: Option<&treb_artifacts::Artifact>, constructor_args: &alloy_primitives::Bytes) -> alloy_primitives::B256 {
    let mut hasher = Sha256::new();
    if let Some(bytecode) = artifact.and_then(|a| a.bytecode.as_ref()) {
        if let Ok(bytes) = hex::decode(bytecode.object.trim_start_matches("0x")) {
            hasher.update(&bytes);
        }
    }
    hasher.update(constructor_args.as_ref());
    alloy_primitives::B256::from_slice(&hasher.finalize())
}

trait WithSourceCommit {
    fn with_source_commit(self, commit: Option<&str>) -> Self;
}

impl WithSourceCommit for Deployment {
    fn with_source_commit(mut self, commit: Option<&str>) -> Self {
        if let Some(commit) = commit {
            self.tags.insert(format!("source_commit:{commit}"));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use treb_common::NoVcs;
    use treb_indexer::{builder::NoopBuilder, Indexer};

    #[test]
    fn parse_builds_one_deployment_per_pending_contract() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = Indexer::new(dir.path());
        indexer.index(&[], &dir.path().join("out"), &NoopBuilder).unwrap();
        let abi_registry = AbiRegistry::new();
        let vcs = NoVcs;
        let parser = ResultParser::new(&indexer, &abi_registry, &vcs, dir.path());

        let execution = ScriptExecution {
            deployments: vec![PendingDeployment {
                transaction_id: "tx1".into(),
                address: Address::repeat_byte(7),
                contract_name: "Counter".into(),
                deployment_type: treb_registry::DeploymentType::Singleton,
                artifact_path: Some("src/Counter.sol:Counter".into()),
                salt: None,
                constructor_args: None,
                seq: 0,
            }],
            ..Default::default()
        };

        let changeset = parser.parse(&execution, "staging", "script/Deploy.s.sol", 1);
        assert_eq!(changeset.deployments.adds.len(), 1);
        assert_eq!(changeset.deployments.adds[0].contract_name, "Counter");
    }
}

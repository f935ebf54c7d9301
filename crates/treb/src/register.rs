//! `register` (§6, scenario S5): turns a mined transaction's contract
//! creations into registry `Deployment` entries. Identity is matched by
//! init-code prefix against the indexer the same way the runner-driven path
//! does (§9 open question (ii): exact match preferred, substring/heuristic
//! match is a diagnostic, never a silent guarantee), falling back to an
//! interactive prompt or the explicit `--contract`/`--contract-name` flags.

use std::str::FromStr;

use alloy_primitives::{Address, B256};
use dialoguer::{Confirm, Input, Select};
use treb_indexer::{ContractRecord, Filter, Indexer};
use treb_registry::{Changeset, Deployment, DeploymentInfo, DeploymentStatus, DeploymentType, ProxyInfo, ProxyKind, VerificationStatus};
use treb_resolver::ResolveContext;

use crate::capabilities::{TraceCreation, TxTracer};

pub struct RegisterRequest<'a> {
    pub tx_hash: &'a str,
    pub address: Option<Address>,
    pub contract_path: Option<&'a str>,
    pub contract_name: Option<&'a str>,
    pub label: Option<&'a str>,
    pub non_interactive: bool,
}

pub struct RegisterOutcome {
    pub changeset: Changeset,
    pub new_deployment_ids: Vec<String>,
}

/// Traces `tx_hash`, labels each contract creation it contains, and links
/// proxies to their implementation (possibly registering the implementation
/// from a second, separately traced transaction).
pub fn register(indexer: &Indexer, tracer: &dyn TxTracer, ctx: &ResolveContext, request: &RegisterRequest) -> eyre::Result<RegisterOutcome> {
    let creations = trace_creations(tracer, request.tx_hash, request.address)?;
    if creations.is_empty() {
        eyre::bail!("no contract creations found in tx {}", request.tx_hash);
    }
    let tx_hash = parse_tx_hash(request.tx_hash)?;

    let mut pending: Vec<Deployment> = Vec::new();
    for (i, creation) in creations.iter().enumerate() {
        let record = resolve_identity(indexer, creation, request)?;
        let label = creation_label(request, creations.len(), i, &record)?;
        pending.push(build_deployment(creation, &record, request, ctx, tx_hash, label));
    }

    link_proxies(&mut pending, indexer, tracer, request, ctx)?;

    let mut changeset = Changeset::default();
    let mut new_deployment_ids = Vec::new();
    for deployment in pending {
        new_deployment_ids.push(deployment.id());
        changeset.deployments.adds.push(deployment);
    }

    Ok(RegisterOutcome { changeset, new_deployment_ids })
}

fn trace_creations(tracer: &dyn TxTracer, tx_hash: &str, address_filter: Option<Address>) -> eyre::Result<Vec<TraceCreation>> {
    let mut creations = tracer.trace(tx_hash)?;
    if let Some(address) = address_filter {
        creations.retain(|c| c.address == address);
    }
    Ok(creations)
}

fn parse_tx_hash(raw: &str) -> eyre::Result<B256> {
    B256::from_str(raw).map_err(|err| eyre::eyre!("invalid tx hash {raw:?}: {err}"))
}

fn creation_label(request: &RegisterRequest, total: usize, index: usize, record: &Option<ContractRecord>) -> eyre::Result<String> {
    if let Some(label) = request.label {
        return Ok(if total == 1 { label.to_string() } else { format!("{label}-{index}") });
    }
    if request.non_interactive {
        return Ok(String::new());
    }
    let name = record.as_ref().map(|r| r.name.as_str()).unwrap_or("contract");
    Ok(Input::<String>::new().with_prompt(format!("label for {name} (creation #{index})")).allow_empty(true).interact_text()?)
}

/// Matches `init_code` against every known artifact's creation bytecode as a
/// prefix (the suffix is the constructor arguments actually used); falls back
/// to the `--contract`/`--contract-name` flags, and finally an interactive
/// selector when more than one candidate remains.
fn resolve_identity(indexer: &Indexer, creation: &TraceCreation, request: &RegisterRequest) -> eyre::Result<Option<ContractRecord>> {
    if let Some(path) = request.contract_path {
        return Ok(indexer.get_by_artifact(path));
    }

    let mut candidates: Vec<ContractRecord> = indexer
        .query(&Filter::all())
        .into_iter()
        .filter(|record| creation_matches_record(creation, record))
        .collect();

    if let Some(name) = request.contract_name {
        candidates.retain(|record| record.name == name);
    }

    match candidates.len() {
        0 => Ok(None),
        1 => Ok(Some(candidates.remove(0))),
        _ if request.non_interactive => {
            eyre::bail!("ambiguous contract identity for creation at {:#x}: {} candidates", creation.address, candidates.len())
        }
        _ => {
            let labels: Vec<String> = candidates.iter().map(|c| c.key()).collect();
            let choice = Select::new().with_prompt(format!("contract deployed at {:#x}", creation.address)).items(&labels).interact()?;
            Ok(Some(candidates.remove(choice)))
        }
    }
}

fn creation_matches_record(creation: &TraceCreation, record: &ContractRecord) -> bool {
    let Some(artifact) = &record.artifact else { return false };
    let Some(bytecode) = &artifact.bytecode else { return false };
    let Ok(bytes) = hex::decode(bytecode.object.trim_start_matches("0x")) else { return false };
    !bytes.is_empty() && creation.init_code.starts_with(&bytes)
}

#[allow(clippy::too_many_arguments)]
fn build_deployment(creation: &TraceCreation, record: &Option<ContractRecord>, request: &RegisterRequest, ctx: &ResolveContext, tx_hash: B256, label: String) -> Deployment {
    let contract_name = record.as_ref().map(|r| r.name.clone()).or_else(|| request.contract_name.map(str::to_string)).unwrap_or_else(|| "Unknown".to_string());
    let artifact_path = record.as_ref().map(|r| r.key()).or_else(|| request.contract_path.map(str::to_string)).unwrap_or_default();

    Deployment {
        address: creation.address,
        contract_name,
        label,
        namespace: ctx.namespace.clone(),
        chain_id: ctx.chain_id,
        ty: DeploymentType::Singleton,
        salt: B256::ZERO,
        init_code_hash: alloy_primitives::keccak256(&creation.init_code),
        constructor_args: Default::default(),
        artifact_path,
        source_hash: record.as_ref().and_then(|r| r.artifact.as_ref()).and_then(|a| a.source_hash()),
        compiler_version: None,
        script_path: None,
        tags: Default::default(),
        verification_status: VerificationStatus::Pending,
        proxy_info: None,
        deployment_info: DeploymentInfo {
            block_number: None,
            timestamp: None,
            tx_hash: Some(tx_hash),
            safe_tx_hash: None,
            deployer_address: Default::default(),
            safe_address: None,
            safe_nonce: None,
            status: DeploymentStatus::Executed,
        },
        fork: false,
    }
}

/// Interactively asks, per creation, whether it is a proxy, and if so
/// resolves its implementation: another creation in the same tx, an existing
/// deployment id, or a fresh trace of a second tx (§6: "may recursively
/// prompt for implementation-tx when a proxy's implementation is in a
/// different tx").
fn link_proxies(pending: &mut Vec<Deployment>, indexer: &Indexer, tracer: &dyn TxTracer, request: &RegisterRequest, ctx: &ResolveContext) -> eyre::Result<()> {
    if request.non_interactive {
        return Ok(());
    }

    let addresses: Vec<Address> = pending.iter().map(|d| d.address).collect();
    for address in addresses {
        let prompt = format!("is {address:#x} a proxy?");
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            continue;
        }

        let sibling_labels: Vec<String> = pending.iter().filter(|d| d.address != address).map(|d| format!("{:#x} ({})", d.address, d.contract_name)).collect();

        let implementation_id = if !sibling_labels.is_empty() && Confirm::new().with_prompt("is the implementation one of the other creations in this tx?").interact()? {
            let choice = Select::new().with_prompt("implementation").items(&sibling_labels).interact()?;
            let impl_address = pending.iter().filter(|d| d.address != address).nth(choice).map(|d| d.address).unwrap();
            pending.iter().find(|d| d.address == impl_address).map(|d| d.id())
        } else {
            let impl_tx: String = Input::new().with_prompt("implementation tx hash (blank if it is already registered)").allow_empty(true).interact_text()?;
            if impl_tx.trim().is_empty() {
                Some(Input::<String>::new().with_prompt("existing implementation deployment id").interact_text()?)
            } else {
                let impl_creations = trace_creations(tracer, impl_tx.trim(), None)?;
                if impl_creations.is_empty() {
                    eyre::bail!("no contract creations found in tx {}", impl_tx.trim());
                }
                let impl_creation = if impl_creations.len() == 1 {
                    &impl_creations[0]
                } else {
                    let labels: Vec<String> = impl_creations.iter().map(|c| format!("{:#x}", c.address)).collect();
                    let choice = Select::new().with_prompt("implementation creation").items(&labels).interact()?;
                    &impl_creations[choice]
                };
                let impl_record = resolve_identity(indexer, impl_creation, request)?;
                let impl_tx_hash = parse_tx_hash(impl_tx.trim())?;
                let impl_deployment = build_deployment(impl_creation, &impl_record, request, ctx, impl_tx_hash, String::new());
                let id = impl_deployment.id();
                pending.push(impl_deployment);
                Some(id)
            }
        };

        if let Some(implementation_deployment_id) = implementation_id {
            if let Some(deployment) = pending.iter_mut().find(|d| d.address == address) {
                deployment.ty = DeploymentType::Proxy;
                deployment.proxy_info = Some(ProxyInfo { implementation_deployment_id, admin_address: None, proxy_kind: ProxyKind::Erc1967 });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::TxTracer;

    struct FixedTracer {
        creations: Vec<TraceCreation>,
    }

    impl TxTracer for FixedTracer {
        fn trace(&self, _tx_hash: &str) -> eyre::Result<Vec<TraceCreation>> {
            Ok(self.creations.clone())
        }
    }

    fn ctx() -> ResolveContext {
        ResolveContext { namespace: "staging".to_string(), chain_id: 1 }
    }

    #[test]
    fn single_creation_registers_one_deployment_non_interactively() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = Indexer::new(dir.path());
        indexer.index(&[], &dir.path().join("out"), &treb_indexer::NoopBuilder).unwrap();

        let tracer = FixedTracer { creations: vec![TraceCreation { address: Address::repeat_byte(0xAA), init_code: vec![1, 2, 3] }] };
        let request = RegisterRequest {
            tx_hash: "0xdead00000000000000000000000000000000000000000000000000000000",
            address: None,
            contract_path: None,
            contract_name: Some("Counter"),
            label: None,
            non_interactive: true,
        };

        let outcome = register(&indexer, &tracer, &ctx(), &request).unwrap();
        assert_eq!(outcome.changeset.deployments.adds.len(), 1);
        assert_eq!(outcome.new_deployment_ids.len(), 1);
        assert_eq!(outcome.changeset.deployments.adds[0].contract_name, "Counter");
    }

    #[test]
    fn no_creations_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = Indexer::new(dir.path());
        indexer.index(&[], &dir.path().join("out"), &treb_indexer::NoopBuilder).unwrap();
        let tracer = FixedTracer { creations: vec![] };
        let request = RegisterRequest {
            tx_hash: "0xdead00000000000000000000000000000000000000000000000000000000",
            address: None,
            contract_path: None,
            contract_name: None,
            label: None,
            non_interactive: true,
        };
        assert!(register(&indexer, &tracer, &ctx(), &request).is_err());
    }
}

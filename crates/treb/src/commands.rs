use std::path::Path;
use std::sync::Arc;

use dialoguer::Confirm;
use treb_config::{Config, DefaultNamer};
use treb_registry::{LocalConfig, ListFilter, RegistryStore};
use treb_resolver::{ResolveContext, Resolver};

use crate::capabilities::{NoopTxTracer, ShellBuilder, ShellVerifier, Verifier, VerifierBackend};
use crate::cli::{Cli, Command, ConfigAction, DeploymentTypeArg};
use crate::display;
use crate::selectors::{InteractiveDeploymentSelector, InteractiveStringSelector};

pub fn dispatch(cli: &Cli, project_root: &Path, non_interactive: bool) -> eyre::Result<()> {
    match &cli.command {
        Command::Run { script, network, namespace, env, dry_run, debug, debug_json } => {
            run(project_root, script, namespace, network, env, *dry_run, *debug, *debug_json, non_interactive)
        }
        Command::List { contract, label, ty, fork, no_fork, json } => {
            list(project_root, contract.as_deref(), label.as_deref(), *ty, *fork, *no_fork, *json)
        }
        Command::Show { reference, no_fork } => show(project_root, reference, *no_fork, non_interactive),
        Command::Verify { reference, all, force, contract_path: _, etherscan, blockscout, sourcify, blockscout_verifier_url: _ } => {
            verify(project_root, reference.as_deref(), *all, *force, *etherscan, *blockscout, *sourcify, non_interactive)
        }
        Command::Tag { reference, add, remove } => tag(project_root, reference, add.as_deref(), remove.as_deref(), non_interactive),
        Command::Register { tx_hash, address, contract_path, contract_name, label, skip_verify } => {
            register(project_root, tx_hash, address.as_deref(), contract_path.as_deref(), contract_name.as_deref(), label.as_deref(), *skip_verify, non_interactive)
        }
        Command::Reset { namespace, chain } => reset(project_root, namespace, *chain, non_interactive),
        Command::Networks => networks(project_root),
        Command::Config { action } => config_cmd(project_root, action.as_ref()),
        Command::Init => init(project_root),
        Command::Migrate { prune_empty, rewrite_toolchain_config } => migrate(project_root, *prune_empty, *rewrite_toolchain_config, non_interactive),
    }
}

fn open_registry(project_root: &Path) -> eyre::Result<RegistryStore> {
    Ok(RegistryStore::open(project_root.join(".treb"))?)
}

fn current_context(project_root: &Path, config: &Config) -> eyre::Result<ResolveContext> {
    let local = LocalConfig::load(&project_root.join(".treb"))?;
    let namespace = local.namespace.ok_or_else(|| eyre::eyre!("no namespace selected; run `treb config set namespace <ns>`"))?;
    let network = local.network.ok_or_else(|| eyre::eyre!("no network selected; run `treb config set network <name>`"))?;
    let chain_id = *config.network_chain_ids.get(&network).ok_or_else(|| eyre::eyre!("network {network:?} has no configured chain id"))?;
    Ok(ResolveContext { namespace, chain_id })
}

#[allow(clippy::too_many_arguments)]
fn run(
    project_root: &Path,
    script: &str,
    namespace: &str,
    network: &str,
    env: &[String],
    dry_run: bool,
    debug: bool,
    debug_json: bool,
    non_interactive: bool,
) -> eyre::Result<()> {
    let config = Config::load(project_root)?;
    let indexer = treb_indexer::global(project_root);
    let builder: Arc<dyn treb_indexer::Builder> = Arc::new(ShellBuilder { binary: "forge".to_string() });
    let orchestrator = treb_core::Orchestrator::new(project_root, indexer, builder, config);

    let env_map = env
        .iter()
        .filter_map(|kv| kv.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let request = treb_core::RunRequest {
        script_path: script.to_string(),
        namespace: namespace.to_string(),
        network: network.to_string(),
        env: env_map,
        dry_run,
        debug,
        debug_json,
        non_interactive,
    };

    let selector = InteractiveStringSelector;
    let param_selector: Option<&dyn treb_params::Selector> = if non_interactive { None } else { Some(&selector) };
    let report = orchestrator.run(&request, param_selector)?;

    tracing::info!(
        deployments = report.changeset.deployments.adds.len(),
        transactions = report.changeset.transactions.adds.len(),
        success = report.execution.success,
        "run complete"
    );
    Ok(())
}

fn list(project_root: &Path, contract: Option<&str>, label: Option<&str>, ty: Option<DeploymentTypeArg>, fork: bool, no_fork: bool, json: bool) -> eyre::Result<()> {
    let store = open_registry(project_root)?;
    let filter = ListFilter {
        contract: contract.map(str::to_string),
        label: label.map(str::to_string),
        ty: ty.map(map_type),
        fork_only: fork,
        no_fork,
        ..Default::default()
    };
    let deployments = store.list(&filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&deployments)?);
    } else {
        println!("{}", display::deployments_table(&deployments));
    }
    Ok(())
}

fn map_type(ty: DeploymentTypeArg) -> treb_registry::DeploymentType {
    match ty {
        DeploymentTypeArg::Singleton => treb_registry::DeploymentType::Singleton,
        DeploymentTypeArg::Proxy => treb_registry::DeploymentType::Proxy,
        DeploymentTypeArg::Library => treb_registry::DeploymentType::Library,
    }
}

fn show(project_root: &Path, reference: &str, no_fork: bool, non_interactive: bool) -> eyre::Result<()> {
    let config = Config::load(project_root)?;
    let store = open_registry(project_root)?;
    let ctx = current_context(project_root, &config)?;
    let selector = InteractiveDeploymentSelector;
    let resolver_selector: Option<&dyn treb_resolver::Selector> = if non_interactive { None } else { Some(&selector) };
    let resolver = Resolver::new(&store, resolver_selector, non_interactive);
    let resolved = resolver.resolve(reference, &ctx, true)?;
    let _ = no_fork;
    println!("{}", display::deployment_detail(&resolved.deployment));
    if let Some(implementation) = resolved.implementation {
        println!("implementation:\n{}", display::deployment_detail(&implementation));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn verify(project_root: &Path, reference: Option<&str>, all: bool, _force: bool, etherscan: bool, blockscout: bool, sourcify: bool, non_interactive: bool) -> eyre::Result<()> {
    let config = Config::load(project_root)?;
    let store = open_registry(project_root)?;
    let ctx = current_context(project_root, &config)?;

    let targets = if all {
        store.list(&ListFilter { namespace: Some(ctx.namespace.clone()), chain: Some(ctx.chain_id), ..Default::default() })
    } else {
        let reference = reference.ok_or_else(|| eyre::eyre!("verify needs a reference or --all"))?;
        let resolver = Resolver::new(&store, None, non_interactive);
        vec![resolver.resolve(reference, &ctx, false)?.deployment]
    };

    let backends = backends_from_flags(etherscan, blockscout, sourcify);
    let verifier = ShellVerifier { binary: "forge".to_string() };
    for deployment in &targets {
        for backend in &backends {
            let status = verifier.verify(*backend, deployment)?;
            tracing::info!(deployment = %deployment.id(), backend = backend.as_str(), ?status, "verification attempted");
        }
    }
    Ok(())
}

fn backends_from_flags(etherscan: bool, blockscout: bool, sourcify: bool) -> Vec<VerifierBackend> {
    if !etherscan && !blockscout && !sourcify {
        return vec![VerifierBackend::Etherscan, VerifierBackend::Blockscout, VerifierBackend::Sourcify];
    }
    let mut backends = Vec::new();
    if etherscan {
        backends.push(VerifierBackend::Etherscan);
    }
    if blockscout {
        backends.push(VerifierBackend::Blockscout);
    }
    if sourcify {
        backends.push(VerifierBackend::Sourcify);
    }
    backends
}

fn tag(project_root: &Path, reference: &str, add: Option<&str>, remove: Option<&str>, non_interactive: bool) -> eyre::Result<()> {
    let config = Config::load(project_root)?;
    let store = open_registry(project_root)?;
    let ctx = current_context(project_root, &config)?;
    let resolver = Resolver::new(&store, None, non_interactive);
    let mut deployment = resolver.resolve(reference, &ctx, false)?.deployment;

    if add.is_none() && remove.is_none() {
        println!("{}", deployment.tags.iter().cloned().collect::<Vec<_>>().join(", "));
        return Ok(());
    }

    if let Some(tag) = add {
        deployment.tags.insert(tag.to_string());
    }
    if let Some(tag) = remove {
        deployment.tags.remove(tag);
    }

    let mut changeset = treb_registry::Changeset::default();
    changeset.deployments.updates.push(deployment);
    store.apply(changeset)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn register(
    project_root: &Path,
    tx_hash: &str,
    address: Option<&str>,
    contract_path: Option<&str>,
    contract_name: Option<&str>,
    label: Option<&str>,
    skip_verify: bool,
    non_interactive: bool,
) -> eyre::Result<()> {
    let config = Config::load(project_root)?;
    let indexer = treb_indexer::global(project_root);
    indexer.index(&[], &project_root.join("out"), &ShellBuilder { binary: "forge".to_string() })?;
    let store = open_registry(project_root)?;
    let ctx = current_context(project_root, &config)?;

    let address: Option<alloy_primitives::Address> = address.map(|a| a.parse()).transpose().map_err(|err| eyre::eyre!("invalid --address: {err}"))?;
    let request = crate::register::RegisterRequest { tx_hash, address, contract_path, contract_name, label, non_interactive };

    let outcome = crate::register::register(&indexer, &NoopTxTracer, &ctx, &request)?;
    let new_ids = outcome.new_deployment_ids.clone();
    store.apply(outcome.changeset)?;

    if !skip_verify {
        let verifier = ShellVerifier { binary: "forge".to_string() };
        let backends = [VerifierBackend::Etherscan, VerifierBackend::Blockscout, VerifierBackend::Sourcify];
        for id in &new_ids {
            if let Some(deployment) = store.get_by_id(id) {
                for backend in backends {
                    let status = verifier.verify(backend, &deployment)?;
                    tracing::info!(deployment = %id, backend = backend.as_str(), ?status, "verification attempted");
                }
            }
        }
    }

    println!("registered {} deployment(s) from {tx_hash}", new_ids.len());
    Ok(())
}

fn reset(project_root: &Path, namespace: &str, chain: u64, non_interactive: bool) -> eyre::Result<()> {
    let store = open_registry(project_root)?;
    let changeset = store.reset(namespace, chain);

    println!(
        "about to delete {} deployments, {} transactions, {} safe transactions for {namespace}/{chain}",
        changeset.deployments.deletes.len(),
        changeset.transactions.deletes.len(),
        changeset.safe_transactions.deletes.len(),
    );

    if !non_interactive && !Confirm::new().with_prompt("Continue?").interact()? {
        return Ok(());
    }

    store.apply(changeset)?;
    Ok(())
}

fn networks(project_root: &Path) -> eyre::Result<()> {
    let config = Config::load(project_root)?;
    println!("{}", display::networks_table(&config.networks()));
    Ok(())
}

fn config_cmd(project_root: &Path, action: Option<&ConfigAction>) -> eyre::Result<()> {
    let dir = project_root.join(".treb");
    let mut local = LocalConfig::load(&dir)?;
    match action {
        None => {
            println!("namespace = {:?}", local.namespace);
            println!("network = {:?}", local.network);
            for (k, v) in &local.extra {
                println!("{k} = {v:?}");
            }
        }
        Some(ConfigAction::Set { key, value }) => {
            local.set(key, value);
            local.save(&dir)?;
        }
        Some(ConfigAction::Remove { key }) => {
            local.remove(key);
            local.save(&dir)?;
        }
    }
    Ok(())
}

fn init(project_root: &Path) -> eyre::Result<()> {
    let dir = project_root.join(".treb");
    std::fs::create_dir_all(&dir)?;
    LocalConfig::default().save(&dir)?;

    let treb_toml = project_root.join("treb.toml");
    if !treb_toml.exists() {
        std::fs::write(&treb_toml, "[accounts]\n\n[namespace]\n")?;
    }
    println!("scaffolded {}", dir.display());
    Ok(())
}

fn migrate(project_root: &Path, prune_empty: bool, rewrite_toolchain_config: bool, non_interactive: bool) -> eyre::Result<()> {
    let config = Config::load(project_root)?;
    if !config.toolchain.has_legacy_sender_config() {
        println!("no legacy [profile.*.treb.*] sections found");
        return Ok(());
    }

    let mut plan = treb_config::migrate::plan_migration(&config.toolchain, &config.treb, &DefaultNamer);
    if prune_empty {
        let pruned = treb_config::migrate::prune_empty_namespaces(&mut plan);
        for name in pruned {
            println!("pruned empty namespace {name}");
        }
    }

    println!(
        "migrated {} namespace(s), merged {} duplicate account(s)",
        plan.namespaces_migrated.len(),
        plan.duplicate_accounts_merged
    );

    if !non_interactive && !Confirm::new().with_prompt("Write treb.toml?").interact()? {
        return Ok(());
    }

    let rendered = toml::to_string_pretty(&plan.treb_toml)?;
    std::fs::write(project_root.join("treb.toml"), rendered)?;

    if rewrite_toolchain_config {
        println!("toolchain config rewrite not yet wired; remove [profile.*.treb.*] sections by hand");
    }
    Ok(())
}

//! C11 — the single synchronous pipeline every CLI `run` invocation drives
//! (§4.11): index → resolve params → build senders → run script → parse
//! results → apply changeset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use treb_abi::AbiRegistry;
use treb_common::{Clock, SystemClock, Vcs};
use treb_config::Config;
use treb_events::{Aggregator, ScriptExecution};
use treb_indexer::{Builder, Indexer};
use treb_params::{ParamParser, Selector as ParamSelector};
use treb_registry::{Changeset, RegistryStore};
use treb_resolver::ResolveContext;
use treb_runner::{CancelToken, Invocation, Runner};
use treb_senders::{AccountConfig, SenderBuilder};

use crate::error::{OrchestratorError, Result};
use crate::meta_resolver::RegistryMetaResolver;

/// One `run <script>` invocation's parameters (§6 `run` flags).
pub struct RunRequest {
    pub script_path: String,
    pub namespace: String,
    pub network: String,
    pub env: HashMap<String, String>,
    pub dry_run: bool,
    pub debug: bool,
    pub debug_json: bool,
    pub non_interactive: bool,
}

pub struct RunReport {
    pub execution: ScriptExecution,
    pub changeset: Changeset,
}

pub struct Orchestrator {
    pub project_root: PathBuf,
    pub indexer: Arc<Indexer>,
    pub builder: Arc<dyn Builder>,
    pub abi_registry: AbiRegistry,
    pub vcs: Arc<dyn Vcs>,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
    pub registry_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub runner_binary: PathBuf,
}

impl Orchestrator {
    pub fn new(project_root: impl Into<PathBuf>, indexer: Arc<Indexer>, builder: Arc<dyn Builder>, config: Config) -> Self {
        let project_root = project_root.into();
        Self {
            registry_dir: project_root.join(".treb"),
            artifacts_dir: project_root.join("out"),
            runner_binary: PathBuf::from("forge"),
            project_root,
            indexer,
            builder,
            abi_registry: AbiRegistry::new(),
            vcs: Arc::new(treb_common::GitVcs),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn run(&self, request: &RunRequest, param_selector: Option<&dyn ParamSelector>) -> Result<RunReport> {
        self.indexer.index(&[], &self.artifacts_dir, self.builder.as_ref())?;

        let namespace_config = self.config.namespace(&request.namespace)?;
        let network_url = self.config.network_url(&request.network)?.to_string();
        let chain_id = *self
            .config
            .network_chain_ids
            .get(&request.network)
            .ok_or_else(|| OrchestratorError::UnknownChainId(request.network.clone()))?;

        let source = std::fs::read_to_string(&request.script_path)?;

        let declared_params = treb_params::scan_params(&source);
        let sender_names = treb_senders::parse_senders_tag(&source);

        let registry = RegistryStore::open(&self.registry_dir)?;
        let ctx = ResolveContext { namespace: request.namespace.clone(), chain_id };
        let meta_resolver = RegistryMetaResolver::new(&self.indexer, &registry, ctx, &namespace_config.senders);
        let param_parser = ParamParser { resolver: &meta_resolver, selector: param_selector, non_interactive: request.non_interactive };
        let resolved_params = param_parser.resolve_params(&declared_params, &request.env)?;

        let accounts: HashMap<String, AccountConfig> = self.config.treb.accounts.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let sender_builder = SenderBuilder::new(&accounts);
        let resolved_senders = sender_builder.resolve(&sender_names)?;
        let init_blob = treb_senders::encode_init_blob(&resolved_senders);

        let mut env = resolved_params;
        env.insert("TREB_NAMESPACE".to_string(), request.namespace.clone());
        env.insert("TREB_NETWORK".to_string(), request.network.clone());
        env.insert("TREB_SENDERS_INIT".to_string(), hex::encode(&init_blob));

        let invocation = Invocation {
            binary: self.runner_binary.clone(),
            script_path: request.script_path.clone(),
            profile: namespace_config.profile.clone(),
            network_url,
            env,
            dry_run: request.dry_run,
            debug: request.debug,
            debug_json: request.debug_json,
        };

        let outcome = Runner::new().run(invocation, &CancelToken::new())?;

        let mut aggregator = Aggregator::new();
        for frame in outcome.frames {
            aggregator.ingest(frame);
        }
        let execution = aggregator.finish();

        let result_parser = treb_events::ResultParser::new(&self.indexer, &self.abi_registry, self.vcs.as_ref(), &self.project_root);
        let changeset = result_parser.parse(&execution, &request.namespace, &request.script_path, chain_id);

        registry.apply(changeset.clone())?;

        Ok(RunReport { execution, changeset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_network_is_rejected_before_indexing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        let indexer = Arc::new(Indexer::new(dir.path()));
        let orchestrator = Orchestrator::new(dir.path(), indexer, Arc::new(treb_indexer::NoopBuilder), config);

        let request = RunRequest {
            script_path: "script/Deploy.s.sol".to_string(),
            namespace: "staging".to_string(),
            network: "mainnet".to_string(),
            env: HashMap::new(),
            dry_run: false,
            debug: false,
            debug_json: false,
            non_interactive: true,
        };

        let err = orchestrator.run(&request, None).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(_)));
    }
}

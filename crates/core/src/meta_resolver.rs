//! Wires `treb-params`'s `MetaResolver` seam to the concrete crates a script
//! parameter's meta-type actually resolves against (§4.6: "resolve
//! meta-typed references", data flow "parameter parser (reads C9 for
//! references)").

use std::collections::BTreeMap;

use treb_indexer::Indexer;
use treb_params::{MetaResolver, ParamType, ResolveOutcome};
use treb_registry::RegistryStore;
use treb_resolver::{ResolveContext, ResolveError, Resolver};

pub struct RegistryMetaResolver<'a> {
    indexer: &'a Indexer,
    store: &'a RegistryStore,
    ctx: ResolveContext,
    /// `[namespace.<name>.senders]`: role -> account name, the table a
    /// `sender`-typed parameter resolves a role query against.
    namespace_senders: &'a BTreeMap<String, String>,
}

impl<'a> RegistryMetaResolver<'a> {
    pub fn new(
        indexer: &'a Indexer,
        store: &'a RegistryStore,
        ctx: ResolveContext,
        namespace_senders: &'a BTreeMap<String, String>,
    ) -> Self {
        Self { indexer, store, ctx, namespace_senders }
    }

    fn resolve_deployment(&self, query: &str) -> ResolveOutcome {
        let resolver = Resolver::new(self.store, None, true);
        match resolver.resolve(query, &self.ctx, false) {
            Ok(resolved) => ResolveOutcome::Resolved(resolved.deployment.id()),
            Err(ResolveError::NotFound(_)) => ResolveOutcome::NotFound,
            Err(ResolveError::Ambiguous { .. }) => {
                let needle = query.to_lowercase();
                let candidates: Vec<String> = self
                    .store
                    .list(&treb_registry::ListFilter {
                        namespace: Some(self.ctx.namespace.clone()),
                        chain: Some(self.ctx.chain_id),
                        ..Default::default()
                    })
                    .into_iter()
                    .filter(|d| d.contract_name.to_lowercase().contains(&needle))
                    .map(|d| d.id())
                    .collect();
                ResolveOutcome::Candidates(candidates)
            }
        }
    }

    fn resolve_artifact(&self, query: &str) -> ResolveOutcome {
        let candidates = self.indexer.search(query);
        match candidates.len() {
            0 => ResolveOutcome::NotFound,
            1 => ResolveOutcome::Resolved(candidates[0].key()),
            _ => ResolveOutcome::Candidates(candidates.iter().map(|c| c.key()).collect()),
        }
    }

    fn resolve_sender(&self, query: &str) -> ResolveOutcome {
        match self.namespace_senders.get(query) {
            Some(account_name) => ResolveOutcome::Resolved(account_name.clone()),
            None => ResolveOutcome::NotFound,
        }
    }
}

impl MetaResolver for RegistryMetaResolver<'_> {
    fn resolve(&self, meta_type: ParamType, query: &str) -> ResolveOutcome {
        match meta_type {
            ParamType::Deployment => self.resolve_deployment(query),
            ParamType::Artifact => self.resolve_artifact(query),
            ParamType::Sender => self.resolve_sender(query),
            _ => ResolveOutcome::NotFound,
        }
    }
}

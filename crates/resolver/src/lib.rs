//! C10 — registry resolver: turns a single reference string into a
//! `Deployment`, trying six strategies in order (§4.10).

pub mod error;

use once_cell::sync::Lazy;
use regex::Regex;
use treb_registry::{Deployment, RegistryStore};

pub use error::{ResolveError, Result};

static FULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<ns>[^/]+)/(?P<chain>\d+)/(?P<name>[^:/]+)(:(?P<label>.+))?$").unwrap());
static CHAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<chain>\d+)/(?P<name>[^:/]+)(:(?P<label>.+))?$").unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<name>[^:/]+)(:(?P<label>.+))?$").unwrap());
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

/// Interactive disambiguation for stage 6 (substring search): mirrors the
/// same out-of-scope terminal-rendering boundary the indexer draws.
pub trait Selector: Send + Sync {
    fn select(&self, candidates: &[Deployment]) -> Option<Deployment>;
}

#[derive(Debug, Clone)]
pub struct ResolveContext {
    pub namespace: String,
    pub chain_id: u64,
}

#[derive(Debug, Clone)]
pub struct ResolvedMatch {
    pub deployment: Deployment,
    pub implementation: Option<Deployment>,
}

pub struct Resolver<'a> {
    store: &'a RegistryStore,
    selector: Option<&'a dyn Selector>,
    non_interactive: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a RegistryStore, selector: Option<&'a dyn Selector>, non_interactive: bool) -> Self {
        Self { store, selector, non_interactive }
    }

    pub fn resolve(&self, reference: &str, ctx: &ResolveContext, resolve_proxy: bool) -> Result<ResolvedMatch> {
        let deployment = self.resolve_deployment(reference, ctx)?;
        let implementation = if resolve_proxy { self.chase_implementation(&deployment) } else { None };
        Ok(ResolvedMatch { deployment, implementation })
    }

    fn chase_implementation(&self, deployment: &Deployment) -> Option<Deployment> {
        let proxy_info = deployment.proxy_info.as_ref()?;
        self.store.get_by_id(&proxy_info.implementation_deployment_id)
    }

    fn resolve_deployment(&self, reference: &str, ctx: &ResolveContext) -> Result<Deployment> {
        if let Some(captures) = FULL_RE.captures(reference) {
            let id = build_id(&captures["ns"], &captures["chain"], &captures["name"], captures.name("label").map(|m| m.as_str()));
            if let Some(deployment) = self.store.get_by_id(&id) {
                return Ok(deployment);
            }
        }

        if let Some(captures) = CHAIN_RE.captures(reference) {
            let id = build_id(&ctx.namespace, &captures["chain"], &captures["name"], captures.name("label").map(|m| m.as_str()));
            if let Some(deployment) = self.store.get_by_id(&id) {
                return Ok(deployment);
            }
        }

        if !reference.starts_with("0x") {
            if let Some(captures) = NAME_RE.captures(reference) {
                let id = build_id(&ctx.namespace, &ctx.chain_id.to_string(), &captures["name"], captures.name("label").map(|m| m.as_str()));
                if let Some(deployment) = self.store.get_by_id(&id) {
                    return Ok(deployment);
                }
            }
        }

        if ADDRESS_RE.is_match(reference) {
            if let Ok(addr) = reference.parse() {
                if let Some(deployment) = self.store.get_by_address(ctx.chain_id, addr) {
                    return Ok(deployment);
                }
            }
        }

        if let Some(deployment_id) = self.store.resolve_alias(reference) {
            if let Some(deployment) = self.store.get_by_id(&deployment_id) {
                return Ok(deployment);
            }
        }

        self.substring_search(reference, ctx)
    }

    fn substring_search(&self, reference: &str, ctx: &ResolveContext) -> Result<Deployment> {
        let needle = reference.to_lowercase();
        let candidates: Vec<Deployment> = self
            .store
            .list(&treb_registry::ListFilter { namespace: Some(ctx.namespace.clone()), chain: Some(ctx.chain_id), ..Default::default() })
            .into_iter()
            .filter(|d| d.contract_name.to_lowercase().contains(&needle))
            .collect();

        match candidates.len() {
            0 => Err(ResolveError::NotFound(reference.to_string())),
            1 => Ok(candidates.into_iter().next().unwrap()),
            n => {
                if self.non_interactive {
                    return Err(ResolveError::Ambiguous { query: reference.to_string(), candidates: n });
                }
                self.selector
                    .and_then(|s| s.select(&candidates))
                    .ok_or_else(|| ResolveError::Ambiguous { query: reference.to_string(), candidates: n })
            }
        }
    }
}

fn build_id(namespace: &str, chain: &str, name: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{namespace}/{chain}/{name}:{label}"),
        None => format!("{namespace}/{chain}/{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};
    use std::collections::BTreeSet;
    use treb_registry::{Changeset, DeploymentInfo, DeploymentStatus, DeploymentType, VerificationStatus};

    fn sample(namespace: &str, chain_id: u64, name: &str) -> Deployment {
        Deployment {
            address: Address::repeat_byte(1),
            contract_name: name.to_string(),
            label: String::new(),
            namespace: namespace.to_string(),
            chain_id,
            ty: DeploymentType::Singleton,
            salt: B256::ZERO,
            init_code_hash: B256::ZERO,
            constructor_args: Default::default(),
            artifact_path: "src/Foo.sol:Foo".to_string(),
            source_hash: None,
            compiler_version: None,
            script_path: None,
            tags: BTreeSet::new(),
            verification_status: VerificationStatus::Pending,
            proxy_info: None,
            deployment_info: DeploymentInfo {
                block_number: None,
                timestamp: None,
                tx_hash: None,
                safe_tx_hash: None,
                deployer_address: Address::ZERO,
                safe_address: None,
                safe_nonce: None,
                status: DeploymentStatus::Executed,
            },
            fork: false,
        }
    }

    fn store_with(deployment: Deployment) -> (tempfile::TempDir, RegistryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::open(dir.path()).unwrap();
        let mut changeset = Changeset::default();
        changeset.deployments.adds.push(deployment);
        store.apply(changeset).unwrap();
        (dir, store)
    }

    #[test]
    fn resolves_full_reference() {
        let (_dir, store) = store_with(sample("staging", 1, "Foo"));
        let resolver = Resolver::new(&store, None, true);
        let ctx = ResolveContext { namespace: "prod".to_string(), chain_id: 2 };
        let resolved = resolver.resolve("staging/1/Foo", &ctx, false).unwrap();
        assert_eq!(resolved.deployment.contract_name, "Foo");
    }

    #[test]
    fn resolves_name_only_with_implicit_namespace_and_chain() {
        let (_dir, store) = store_with(sample("staging", 1, "Foo"));
        let resolver = Resolver::new(&store, None, true);
        let ctx = ResolveContext { namespace: "staging".to_string(), chain_id: 1 };
        let resolved = resolver.resolve("Foo", &ctx, false).unwrap();
        assert_eq!(resolved.deployment.contract_name, "Foo");
    }

    #[test]
    fn resolves_by_address() {
        let deployment = sample("staging", 1, "Foo");
        let addr = deployment.address;
        let (_dir, store) = store_with(deployment);
        let resolver = Resolver::new(&store, None, true);
        let ctx = ResolveContext { namespace: "staging".to_string(), chain_id: 1 };
        let resolved = resolver.resolve(&addr.to_string(), &ctx, false).unwrap();
        assert_eq!(resolved.deployment.contract_name, "Foo");
    }

    #[test]
    fn non_interactive_ambiguous_substring_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::open(dir.path()).unwrap();
        let mut changeset = Changeset::default();
        changeset.deployments.adds.push(sample("staging", 1, "FooBar"));
        changeset.deployments.adds.push(sample("staging", 1, "FooBaz"));
        store.apply(changeset).unwrap();

        let resolver = Resolver::new(&store, None, true);
        let ctx = ResolveContext { namespace: "staging".to_string(), chain_id: 1 };
        let err = resolver.resolve("Foo", &ctx, false).unwrap_err();
        assert!(matches!(err, ResolveError::Ambiguous { .. }));
    }

    #[test]
    fn not_found_when_nothing_matches() {
        let (_dir, store) = store_with(sample("staging", 1, "Foo"));
        let resolver = Resolver::new(&store, None, true);
        let ctx = ResolveContext { namespace: "staging".to_string(), chain_id: 1 };
        assert!(resolver.resolve("Nonexistent", &ctx, false).is_err());
    }
}

//! Meta-type resolution seam (§4.6): `sender` resolves against declared
//! senders, `deployment` via C10, `artifact` via C2. `treb-params` stays
//! decoupled from those crates — callers inject a `MetaResolver`.

use crate::types::ParamType;

#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    Resolved(String),
    Candidates(Vec<String>),
    NotFound,
}

pub trait MetaResolver: Send + Sync {
    fn resolve(&self, meta_type: ParamType, query: &str) -> ResolveOutcome;
}

/// Resolver double for non-interactive contexts with no meta-typed params.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetaResolver;

impl MetaResolver for NoopMetaResolver {
    fn resolve(&self, _meta_type: ParamType, _query: &str) -> ResolveOutcome {
        ResolveOutcome::NotFound
    }
}

/// Interactive disambiguation when a meta-type query yields more than one
/// candidate. Mirrors the `Selector` boundary the indexer/resolver draw
/// around terminal rendering.
pub trait Selector: Send + Sync {
    fn select(&self, candidates: &[String]) -> Option<String>;
}

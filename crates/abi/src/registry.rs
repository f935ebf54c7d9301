//! `address → ABI`, `address → artifact label`, and `proxy → implementation`
//! maps (§4.3), plus the lazy [`AbiResolver`] capability seam.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use parking_lot::RwLock;

/// What a lazy resolver hands back for an address it was able to identify.
#[derive(Debug, Clone)]
pub struct ResolvedAbi {
    pub name: String,
    pub abi: JsonAbi,
    pub is_proxy: bool,
    pub implementation: Option<Address>,
}

/// Out-of-band ABI lookup, e.g. by fetching a verified source from a block
/// explorer. Resolution failures never abort decoding (§4.3) — callers fall
/// back to [`crate::DecodedCall::Unknown`].
pub trait AbiResolver: Send + Sync {
    fn resolve(&self, address: Address) -> Option<ResolvedAbi>;
}

/// Resolver double that never resolves anything; used where no external
/// lookup capability is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResolver;

impl AbiResolver for NoopResolver {
    fn resolve(&self, _address: Address) -> Option<ResolvedAbi> {
        None
    }
}

#[derive(Clone)]
struct Entry {
    name: String,
    abi: JsonAbi,
}

#[derive(Default)]
struct State {
    abis: HashMap<Address, Entry>,
    proxies: HashMap<Address, Address>,
}

pub struct AbiRegistry {
    state: RwLock<State>,
    resolver: Option<Arc<dyn AbiResolver>>,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self { state: RwLock::new(State::default()), resolver: None }
    }

    pub fn with_resolver(resolver: Arc<dyn AbiResolver>) -> Self {
        Self { state: RwLock::new(State::default()), resolver: Some(resolver) }
    }

    pub fn register(&self, address: Address, name: impl Into<String>, abi: JsonAbi) {
        self.state.write().abis.insert(address, Entry { name: name.into(), abi });
    }

    /// Registers an address's ABI straight from a compiled artifact, the
    /// common path when C8 links a fresh deployment back to its source
    /// contract.
    pub fn register_artifact(&self, address: Address, name: impl Into<String>, artifact: &treb_artifacts::Artifact) {
        if let Some(abi) = artifact.abi.clone() {
            self.register(address, name, abi);
        }
    }

    pub fn register_proxy(&self, proxy: Address, implementation: Address) {
        self.state.write().proxies.insert(proxy, implementation);
    }

    pub fn label(&self, address: Address) -> Option<String> {
        self.state.read().abis.get(&address).map(|e| e.name.clone())
    }

    pub fn implementation_of(&self, proxy: Address) -> Option<Address> {
        self.state.read().proxies.get(&proxy).copied()
    }

    /// Looks up the ABI that governs calls sent to `address`: direct
    /// registration first, then proxy-forwarded implementation, then — if
    /// still unresolved and a resolver is installed — a lazy out-of-band
    /// lookup whose result is cached for next time (§4.3).
    pub fn abi_for(&self, address: Address) -> Option<JsonAbi> {
        if let Some(entry) = self.state.read().abis.get(&address) {
            return Some(entry.abi.clone());
        }
        if let Some(implementation) = self.implementation_of(address) {
            if let Some(entry) = self.state.read().abis.get(&implementation) {
                return Some(entry.abi.clone());
            }
        }
        self.resolve_and_cache(address)
    }

    fn resolve_and_cache(&self, address: Address) -> Option<JsonAbi> {
        let resolver = self.resolver.as_ref()?;
        let resolved = resolver.resolve(address)?;
        if resolved.is_proxy {
            if let Some(implementation) = resolved.implementation {
                self.register_proxy(address, implementation);
            }
        }
        self.register(address, resolved.name, resolved.abi.clone());
        Some(resolved.abi)
    }
}

impl Default for AbiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_abi::JsonAbi;

    fn empty_abi() -> JsonAbi {
        serde_json::from_str("[]").unwrap()
    }

    #[test]
    fn direct_registration_is_found() {
        let registry = AbiRegistry::new();
        let addr = Address::repeat_byte(1);
        registry.register(addr, "Foo", empty_abi());
        assert!(registry.abi_for(addr).is_some());
        assert_eq!(registry.label(addr).as_deref(), Some("Foo"));
    }

    #[test]
    fn proxy_forwards_to_implementation_abi() {
        let registry = AbiRegistry::new();
        let proxy = Address::repeat_byte(1);
        let implementation = Address::repeat_byte(2);
        registry.register(implementation, "Impl", empty_abi());
        registry.register_proxy(proxy, implementation);
        assert!(registry.abi_for(proxy).is_some());
    }

    struct AlwaysResolves;
    impl AbiResolver for AlwaysResolves {
        fn resolve(&self, _address: Address) -> Option<ResolvedAbi> {
            Some(ResolvedAbi { name: "Resolved".into(), abi: empty_abi(), is_proxy: false, implementation: None })
        }
    }

    #[test]
    fn lazy_resolver_caches_result() {
        let registry = AbiRegistry::with_resolver(Arc::new(AlwaysResolves));
        let addr = Address::repeat_byte(3);
        assert!(registry.abi_for(addr).is_some());
        assert_eq!(registry.label(addr).as_deref(), Some("Resolved"));
    }

    #[test]
    fn unresolved_without_resolver_returns_none() {
        let registry = AbiRegistry::new();
        assert!(registry.abi_for(Address::repeat_byte(9)).is_none());
    }
}

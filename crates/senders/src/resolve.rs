//! Transitive resolution of declared sender names into a topologically
//! ordered `ResolvedSender` list (§4.5).

use std::collections::{HashMap, HashSet};

use crate::blob::encode_config_bytes;
use crate::error::{Result, SenderError};
use crate::keys::{derive_address, parse_scalar};
use crate::types::{AccountConfig, AccountType, ResolvedSender, SenderKind};

pub struct SenderBuilder<'a> {
    accounts: &'a HashMap<String, AccountConfig>,
}

impl<'a> SenderBuilder<'a> {
    pub fn new(accounts: &'a HashMap<String, AccountConfig>) -> Self {
        Self { accounts }
    }

    /// Pulls in `declared` plus every signer/proposer a multisig among them
    /// transitively references, rejects cycles and dangling references, and
    /// emits senders in topological order (signers before the safes that
    /// reference them; ties broken by declaration order in `declared`).
    pub fn resolve(&self, declared: &[String]) -> Result<Vec<ResolvedSender>> {
        let mut needed: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: Vec<String> = declared.to_vec();

        while let Some(name) = queue.pop() {
            if seen.contains(&name) {
                continue;
            }
            let account = self.accounts.get(&name).ok_or_else(|| SenderError::Dangling(name.clone()))?;
            seen.insert(name.clone());
            needed.push(name.clone());
            if account.ty == AccountType::Multisig {
                if let Some(signer) = &account.signer {
                    queue.push(signer.clone());
                }
                if let Some(proposer) = &account.proposer {
                    queue.push(proposer.clone());
                }
            }
        }

        let ordered = topological_order(&needed, self.accounts)?;

        ordered.into_iter().map(|name| self.build(&name)).collect()
    }

    fn build(&self, name: &str) -> Result<ResolvedSender> {
        let account = self.accounts.get(name).ok_or_else(|| SenderError::Dangling(name.to_string()))?;
        let (kind, account_address) = match account.ty {
            AccountType::PrivateKey => {
                let hex_key = account.private_key.as_deref().ok_or_else(|| SenderError::MissingPrivateKey(name.to_string()))?;
                let scalar = parse_scalar(name, hex_key)?;
                let address = derive_address(name, &scalar)?;
                (SenderKind::PrivateKey { scalar }, address)
            }
            AccountType::Hardware => {
                let derivation_path = account.derivation_path.clone().unwrap_or_default();
                let address = account.address.unwrap_or_default();
                (SenderKind::Hardware { derivation_path }, address)
            }
            AccountType::Multisig => {
                let signer_name = account.signer.clone().ok_or_else(|| SenderError::MissingSigner(name.to_string()))?;
                let safe_address = account.safe.unwrap_or_default();
                (SenderKind::Multisig { safe_address, signer_name, proposer_name: account.proposer.clone() }, safe_address)
            }
        };

        let config_bytes = encode_config_bytes(&kind);
        Ok(ResolvedSender { name: name.to_string(), kind, account: account_address, can_broadcast: account.can_broadcast, config_bytes })
    }
}

/// Kahn's algorithm over the "references" edge (multisig → its signer and
/// proposer); ties broken by the order names were first requested in.
fn topological_order(names: &[String], accounts: &HashMap<String, AccountConfig>) -> Result<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = names.iter().map(|n| (n.as_str(), 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in names {
        let account = &accounts[name];
        if account.ty == AccountType::Multisig {
            for dep in [account.signer.as_deref(), account.proposer.as_deref()].into_iter().flatten() {
                if in_degree.contains_key(dep) {
                    *in_degree.get_mut(name.as_str()).unwrap() += 1;
                    dependents.entry(dep).or_default().push(name.as_str());
                }
            }
        }
    }

    let mut ready: Vec<&str> = names.iter().map(|s| s.as_str()).filter(|n| in_degree[n] == 0).collect();
    let mut ordered = Vec::with_capacity(names.len());

    while !ready.is_empty() {
        ready.sort_by_key(|n| names.iter().position(|x| x == n).unwrap());
        let next = ready.remove(0);
        ordered.push(next.to_string());
        if let Some(deps) = dependents.get(next) {
            for &dependent in deps {
                let degree = in_degree.get_mut(dependent).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    ready.push(dependent);
                }
            }
        }
    }

    if ordered.len() != names.len() {
        let stuck: Vec<&str> = names.iter().map(|s| s.as_str()).filter(|n| !ordered.contains(&n.to_string())).collect();
        return Err(SenderError::Cycle(stuck.join(", ")));
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn pk_account(private_key: &str) -> AccountConfig {
        AccountConfig {
            ty: AccountType::PrivateKey,
            address: None,
            private_key: Some(private_key.to_string()),
            safe: None,
            signer: None,
            derivation_path: None,
            proposer: None,
            governor: None,
            timelock: None,
            can_broadcast: true,
        }
    }

    fn multisig_account(signer: &str, proposer: Option<&str>) -> AccountConfig {
        AccountConfig {
            ty: AccountType::Multisig,
            address: None,
            private_key: None,
            safe: Some(Address::repeat_byte(9)),
            signer: Some(signer.to_string()),
            derivation_path: None,
            proposer: proposer.map(str::to_string),
            governor: None,
            timelock: None,
            can_broadcast: true,
        }
    }

    #[test]
    fn pulls_in_transitive_signer_before_safe() {
        let mut accounts = HashMap::new();
        accounts.insert("deployer".to_string(), pk_account(&format!("0x{}", hex::encode([1u8; 32]))));
        accounts.insert("safe".to_string(), multisig_account("deployer", None));

        let builder = SenderBuilder::new(&accounts);
        let resolved = builder.resolve(&["safe".to_string()]).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "deployer");
        assert_eq!(resolved[1].name, "safe");
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let accounts = HashMap::new();
        let builder = SenderBuilder::new(&accounts);
        assert!(matches!(builder.resolve(&["ghost".to_string()]), Err(SenderError::Dangling(_))));
    }

    #[test]
    fn cycle_between_safes_is_rejected() {
        let mut accounts = HashMap::new();
        accounts.insert("safe_a".to_string(), multisig_account("safe_b", None));
        accounts.insert("safe_b".to_string(), multisig_account("safe_a", None));

        let builder = SenderBuilder::new(&accounts);
        assert!(matches!(builder.resolve(&["safe_a".to_string()]), Err(SenderError::Cycle(_))));
    }
}

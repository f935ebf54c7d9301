//! Rewrites legacy `[profile.<name>.treb.*]` sender tables into a dedicated
//! `treb.toml` with `[accounts.*]` and `[namespace.*]` sections (§6 `migrate`
//! command). Prompting for account names and confirming the rewrite are a CLI
//! concern; this module only computes the plan.

use std::collections::BTreeMap;

use treb_senders::{AccountConfig, AccountType};

use crate::namespace::NamespaceConfig;
use crate::toolchain::ToolchainConfig;
use crate::treb_toml::TrebToml;

/// Supplies a stable account name for a legacy `role = value` pair found
/// under some profile. Implemented by the CLI via an interactive prompt,
/// or by a deterministic default for non-interactive runs.
pub trait AccountNamer {
    fn name_for(&self, profile: &str, role: &str, value: &str) -> String;
}

/// Defaults every account to `<profile>_<role>`; used when
/// `TREB_NON_INTERACTIVE` is set.
pub struct DefaultNamer;

impl AccountNamer for DefaultNamer {
    fn name_for(&self, profile: &str, role: &str, _value: &str) -> String {
        format!("{profile}_{role}")
    }
}

#[derive(Debug, Default)]
pub struct MigrationPlan {
    pub treb_toml: TrebToml,
    pub namespaces_migrated: Vec<String>,
    pub duplicate_accounts_merged: usize,
}

/// Builds a migration plan from `toolchain`'s legacy sections, merging into
/// whatever `treb.toml` already has. Identical `role = value` pairs across
/// profiles collapse onto a single account.
pub fn plan_migration(toolchain: &ToolchainConfig, existing: &TrebToml, namer: &dyn AccountNamer) -> MigrationPlan {
    let mut accounts = existing.accounts.clone();
    let mut namespace = existing.namespace.clone();
    let mut value_to_account: BTreeMap<String, String> = BTreeMap::new();
    let mut duplicate_accounts_merged = 0usize;
    let mut namespaces_migrated = Vec::new();

    for (profile, section) in &toolchain.legacy_treb_sections {
        let Some(table) = section.as_table() else { continue };
        let mut senders = BTreeMap::new();

        for (role, value) in table {
            let Some(value_str) = value.as_str() else { continue };

            let account_name = if let Some(existing_name) = value_to_account.get(value_str) {
                duplicate_accounts_merged += 1;
                existing_name.clone()
            } else {
                let name = namer.name_for(profile, role, value_str);
                let account = infer_account(value_str);
                accounts.insert(name.clone(), account);
                value_to_account.insert(value_str.to_string(), name.clone());
                name
            };

            senders.insert(role.clone(), account_name);
        }

        if !senders.is_empty() {
            namespace.insert(profile.clone(), NamespaceConfig { profile: profile.clone(), senders });
            namespaces_migrated.push(profile.clone());
        }
    }

    MigrationPlan {
        treb_toml: TrebToml { accounts, namespace },
        namespaces_migrated,
        duplicate_accounts_merged,
    }
}

/// A 0x-prefixed 40-hex value is an address (hardware/already-deployed
/// signer), anything else is treated as a raw private key.
fn infer_account(value: &str) -> AccountConfig {
    let is_address = value.starts_with("0x") && value.len() == 42;
    AccountConfig {
        ty: if is_address { AccountType::Hardware } else { AccountType::PrivateKey },
        address: is_address.then(|| value.parse().ok()).flatten(),
        private_key: (!is_address).then(|| value.to_string()),
        safe: None,
        signer: None,
        derivation_path: None,
        proposer: None,
        governor: None,
        timelock: None,
        can_broadcast: true,
    }
}

/// Empty namespaces (no senders migrated, nothing pre-existing) can be
/// pruned once the caller confirms.
pub fn prune_empty_namespaces(plan: &mut MigrationPlan) -> Vec<String> {
    let pruned: Vec<String> =
        plan.treb_toml.namespace.iter().filter(|(_, ns)| ns.senders.is_empty()).map(|(name, _)| name.clone()).collect();
    for name in &pruned {
        plan.treb_toml.namespace.remove(name);
    }
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn toolchain_with_sections(sections: Vec<(&str, Vec<(&str, &str)>)>) -> ToolchainConfig {
        let mut legacy_treb_sections = Map::new();
        for (profile, pairs) in sections {
            let mut table = toml::map::Map::new();
            for (role, value) in pairs {
                table.insert(role.to_string(), toml::Value::String(value.to_string()));
            }
            legacy_treb_sections.insert(profile.to_string(), toml::Value::Table(table));
        }
        ToolchainConfig { legacy_treb_sections, ..Default::default() }
    }

    #[test]
    fn migrates_one_profile_into_one_namespace() {
        let toolchain = toolchain_with_sections(vec![("staging", vec![("deployer", "0xabc123")])]);
        let plan = plan_migration(&toolchain, &TrebToml::default(), &DefaultNamer);
        assert_eq!(plan.namespaces_migrated, vec!["staging".to_string()]);
        assert_eq!(plan.treb_toml.namespace["staging"].senders["deployer"], "staging_deployer");
        assert!(plan.treb_toml.accounts.contains_key("staging_deployer"));
    }

    #[test]
    fn deduplicates_identical_senders_across_namespaces() {
        let toolchain = toolchain_with_sections(vec![
            ("staging", vec![("deployer", "0xdeadbeef")]),
            ("production", vec![("deployer", "0xdeadbeef")]),
        ]);
        let plan = plan_migration(&toolchain, &TrebToml::default(), &DefaultNamer);
        assert_eq!(plan.duplicate_accounts_merged, 1);
        assert_eq!(plan.treb_toml.accounts.len(), 1);
        assert_eq!(
            plan.treb_toml.namespace["staging"].senders["deployer"],
            plan.treb_toml.namespace["production"].senders["deployer"]
        );
    }

    #[test]
    fn prune_removes_namespaces_with_no_senders() {
        let mut plan = MigrationPlan {
            treb_toml: TrebToml {
                accounts: Map::new(),
                namespace: Map::from([("empty".to_string(), NamespaceConfig { profile: "empty".to_string(), senders: Map::new() })]),
            },
            namespaces_migrated: vec![],
            duplicate_accounts_merged: 0,
        };
        let pruned = prune_empty_namespaces(&mut plan);
        assert_eq!(pruned, vec!["empty".to_string()]);
        assert!(plan.treb_toml.namespace.is_empty());
    }
}

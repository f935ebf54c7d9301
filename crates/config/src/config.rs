use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use treb_senders::AccountConfig;

use crate::error::{ConfigError, Result};
use crate::namespace::NamespaceConfig;
use crate::remappings;
use crate::toolchain::ToolchainConfig;
use crate::treb_toml::TrebToml;

#[derive(Debug, Clone)]
pub struct NetworkEntry {
    pub name: String,
    pub url: String,
    pub chain_id: Option<u64>,
}

/// The project's fully loaded, read-only configuration surface: toolchain
/// config, treb's own accounts/namespaces, and remappings (§6).
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub toolchain: ToolchainConfig,
    pub treb: TrebToml,
    pub remappings: Vec<(String, String)>,
    /// `[networks]` in `treb.toml`, layered on top of `foundry.toml`'s
    /// `[rpc_endpoints]` so `networks` can print chain IDs without a live
    /// RPC call.
    pub network_chain_ids: BTreeMap<String, u64>,
}

impl Config {
    pub fn load(project_root: &Path) -> Result<Self> {
        let toolchain = ToolchainConfig::load(&project_root.join("foundry.toml"))?;
        let treb = TrebToml::load(&project_root.join("treb.toml"))?;
        let remappings = remappings::load(&project_root.join("remappings.txt"))?;
        let network_chain_ids = load_network_chain_ids(&project_root.join("treb.toml"))?;

        Ok(Self {
            project_root: project_root.to_path_buf(),
            toolchain,
            treb,
            remappings,
            network_chain_ids,
        })
    }

    pub fn namespace(&self, name: &str) -> Result<&NamespaceConfig> {
        self.treb.namespace(name).ok_or_else(|| ConfigError::UnknownNamespace(name.to_string()))
    }

    pub fn account(&self, name: &str) -> Result<&AccountConfig> {
        self.treb.account(name).ok_or_else(|| ConfigError::UnknownAccount(name.to_string()))
    }

    /// Accounts referenced by a namespace's `[senders]` table, keyed by role.
    pub fn namespace_accounts(&self, namespace: &str) -> Result<BTreeMap<String, AccountConfig>> {
        let ns = self.namespace(namespace)?;
        let mut out = BTreeMap::new();
        for (role, account_name) in &ns.senders {
            let account = self.account(account_name)?;
            out.insert(role.clone(), account.clone());
        }
        Ok(out)
    }

    pub fn network_url(&self, name: &str) -> Result<&str> {
        self.toolchain
            .rpc_endpoints
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    pub fn networks(&self) -> Vec<NetworkEntry> {
        self.toolchain
            .rpc_endpoints
            .iter()
            .map(|(name, url)| NetworkEntry {
                name: name.clone(),
                url: url.clone(),
                chain_id: self.network_chain_ids.get(name).copied(),
            })
            .collect()
    }
}

fn load_network_chain_ids(treb_toml_path: &Path) -> Result<BTreeMap<String, u64>> {
    if !treb_toml_path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = std::fs::read_to_string(treb_toml_path)?;
    let doc: toml::Value = toml::from_str(&crate::env_expand::expand(&raw))?;
    let map = doc
        .get("networks")
        .and_then(|v| v.as_table())
        .map(|t| t.iter().filter_map(|(k, v)| v.as_integer().map(|id| (k.clone(), id as u64))).collect())
        .unwrap_or_default();
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_project(dir: &Path) {
        std::fs::write(
            dir.join("foundry.toml"),
            "[rpc_endpoints]\nmainnet = \"https://eth.example\"\nsepolia = \"https://sepolia.example\"\n",
        )
        .unwrap();
        let mut treb = std::fs::File::create(dir.join("treb.toml")).unwrap();
        write!(
            treb,
            "[accounts.deployer]\ntype = \"private_key\"\nprivate_key = \"0x{:0>64}\"\n\n[namespace.staging]\nprofile = \"staging\"\n\n[namespace.staging.senders]\ndeployer = \"deployer\"\n\n[networks]\nmainnet = 1\nsepolia = 11155111\n",
            "1"
        )
        .unwrap();
    }

    #[test]
    fn loads_accounts_namespaces_and_networks() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.namespace("staging").unwrap().profile, "staging");
        assert!(config.account("deployer").is_ok());
        assert_eq!(config.network_url("mainnet").unwrap(), "https://eth.example");

        let networks = config.networks();
        assert_eq!(networks.len(), 2);
        let mainnet = networks.iter().find(|n| n.name == "mainnet").unwrap();
        assert_eq!(mainnet.chain_id, Some(1));
    }

    #[test]
    fn unknown_namespace_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let config = Config::load(dir.path()).unwrap();
        assert!(matches!(config.namespace("production"), Err(ConfigError::UnknownNamespace(_))));
    }

    #[test]
    fn namespace_accounts_resolves_sender_roles() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let config = Config::load(dir.path()).unwrap();
        let accounts = config.namespace_accounts("staging").unwrap();
        assert!(accounts.contains_key("deployer"));
    }
}

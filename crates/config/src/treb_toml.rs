//! `treb.toml`'s `[accounts.*]` / `[namespace.*]` tables (§6), loaded through
//! `figment` after `${VAR}` expansion has already run over the raw text.

use std::collections::BTreeMap;
use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use treb_senders::AccountConfig;

use crate::env_expand::expand;
use crate::error::Result;
use crate::namespace::NamespaceConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrebToml {
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountConfig>,
    #[serde(default)]
    pub namespace: BTreeMap<String, NamespaceConfig>,
}

impl TrebToml {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let expanded = expand(raw);
        let toml = Toml::string(&expanded);
        let config: TrebToml = Figment::new().merge(toml).extract()?;
        Ok(config)
    }

    pub fn namespace(&self, name: &str) -> Option<&NamespaceConfig> {
        self.namespace.get(name)
    }

    pub fn account(&self, name: &str) -> Option<&AccountConfig> {
        self.accounts.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[accounts.deployer]
type = "private_key"
private_key = "${DEPLOYER_PK}"

[accounts.safe]
type = "multisig"
safe = "0x0000000000000000000000000000000000000001"
signer = "deployer"

[namespace.staging]
profile = "staging"

[namespace.staging.senders]
deployer = "deployer"
admin = "safe"
"#;

    #[test]
    fn parses_accounts_and_namespaces() {
        std::env::set_var("DEPLOYER_PK", "0x01");
        let config = TrebToml::parse(SAMPLE).unwrap();
        assert_eq!(config.accounts.len(), 2);
        let ns = config.namespace("staging").unwrap();
        assert_eq!(ns.profile, "staging");
        assert_eq!(ns.senders.get("admin").unwrap(), "safe");
    }

    #[test]
    fn missing_file_yields_empty_config() {
        let config = TrebToml::load(Path::new("/nonexistent/treb.toml")).unwrap();
        assert!(config.accounts.is_empty());
    }
}

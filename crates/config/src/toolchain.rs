//! Read-only access to the toolchain's own `foundry.toml` (§6: "Toolchain
//! config ... consumed read-only"). Only the sections treb actually needs are
//! modeled; everything else is left as opaque `toml::Value` so a profile
//! using unrelated keys never fails to parse.

use std::collections::BTreeMap;
use std::path::Path;

use crate::env_expand::expand;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct ToolchainConfig {
    pub rpc_endpoints: BTreeMap<String, String>,
    pub etherscan: BTreeMap<String, toml::Value>,
    /// `[profile.<name>.treb.*]`, still present because `migrate` hasn't run.
    pub legacy_treb_sections: BTreeMap<String, toml::Value>,
}

impl ToolchainConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let expanded = expand(raw);
        let doc: toml::Value = toml::from_str(&expanded)?;

        let rpc_endpoints = doc
            .get("rpc_endpoints")
            .and_then(|v| v.as_table())
            .map(|t| {
                t.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let etherscan = doc
            .get("etherscan")
            .and_then(|v| v.as_table())
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let mut legacy_treb_sections = BTreeMap::new();
        if let Some(profiles) = doc.get("profile").and_then(|v| v.as_table()) {
            for (profile_name, profile_value) in profiles {
                if let Some(treb_section) = profile_value.get("treb") {
                    legacy_treb_sections.insert(profile_name.clone(), treb_section.clone());
                }
            }
        }

        Ok(Self { rpc_endpoints, etherscan, legacy_treb_sections })
    }

    pub fn has_legacy_sender_config(&self) -> bool {
        !self.legacy_treb_sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[profile.default]
src = "src"

[profile.default.treb]
deployer = "0xabc"

[rpc_endpoints]
mainnet = "https://eth.example/${API_KEY}"

[etherscan]
mainnet = { key = "${ETHERSCAN_KEY}" }
"#;

    #[test]
    fn parses_rpc_endpoints() {
        std::env::set_var("API_KEY", "secret");
        let cfg = ToolchainConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.rpc_endpoints.get("mainnet").unwrap(), "https://eth.example/secret");
    }

    #[test]
    fn collects_legacy_treb_sections_per_profile() {
        let cfg = ToolchainConfig::parse(SAMPLE).unwrap();
        assert!(cfg.has_legacy_sender_config());
        assert!(cfg.legacy_treb_sections.contains_key("default"));
    }

    #[test]
    fn missing_file_yields_empty_config() {
        let cfg = ToolchainConfig::load(Path::new("/nonexistent/foundry.toml")).unwrap();
        assert!(cfg.rpc_endpoints.is_empty());
        assert!(!cfg.has_legacy_sender_config());
    }
}

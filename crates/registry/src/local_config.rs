//! `.treb/config.local.json` — the user's current namespace/network
//! selection (§4.9, §6). Distinct from `treb.toml`: this file is mutated by
//! the CLI itself (`treb config set ...`), not hand-edited.

use std::path::Path;

use serde::{Deserialize, Serialize};
use treb_common::fs::atomic_write;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalConfig {
    pub namespace: Option<String>,
    pub network: Option<String>,
    #[serde(flatten)]
    pub extra: std::collections::BTreeMap<String, String>,
}

impl LocalConfig {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("config.local.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        atomic_write(&dir.join("config.local.json"), serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "namespace" => self.namespace = Some(value.to_string()),
            "network" => self.network = Some(value.to_string()),
            other => {
                self.extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        match key {
            "namespace" => self.namespace = None,
            "network" => self.network = None,
            other => {
                self.extra.remove(other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_save_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LocalConfig::default();
        config.set("namespace", "staging");
        config.save(dir.path()).unwrap();

        let reloaded = LocalConfig::load(dir.path()).unwrap();
        assert_eq!(reloaded.namespace.as_deref(), Some("staging"));
    }

    #[test]
    fn remove_clears_known_key() {
        let mut config = LocalConfig::default();
        config.set("network", "mainnet");
        config.remove("network");
        assert!(config.network.is_none());
    }
}

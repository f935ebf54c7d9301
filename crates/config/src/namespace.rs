use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `treb.toml`'s `[namespace.<name>]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub profile: String,
    /// `[namespace.<name>.senders]`: role name -> account name.
    #[serde(default)]
    pub senders: BTreeMap<String, String>,
}

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    PrivateKey,
    Hardware,
    Multisig,
}

/// `treb.toml`'s `[accounts.<name>]` table, after `${VAR}` expansion has
/// already run in the config layer (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(rename = "type")]
    pub ty: AccountType,
    pub address: Option<Address>,
    pub private_key: Option<String>,
    pub safe: Option<Address>,
    pub signer: Option<String>,
    pub derivation_path: Option<String>,
    pub proposer: Option<String>,
    #[serde(default)]
    pub governor: Option<String>,
    #[serde(default)]
    pub timelock: Option<String>,
    #[serde(default = "default_can_broadcast")]
    pub can_broadcast: bool,
}

fn default_can_broadcast() -> bool {
    true
}

#[derive(Debug, Clone)]
pub enum SenderKind {
    PrivateKey { scalar: [u8; 32] },
    Hardware { derivation_path: String },
    Multisig { safe_address: Address, signer_name: String, proposer_name: Option<String> },
}

#[derive(Debug, Clone)]
pub struct ResolvedSender {
    pub name: String,
    pub kind: SenderKind,
    pub account: Address,
    pub can_broadcast: bool,
    pub config_bytes: Vec<u8>,
}

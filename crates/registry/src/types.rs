//! The registry's own entities (§3): `Deployment`, `Transaction`,
//! `SafeTransaction`. Nothing outside `treb-registry` may construct these
//! with intent to persist them — ownership is exclusive (§4.9).

use std::collections::BTreeSet;

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentType {
    Singleton,
    Proxy,
    Library,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Partial,
    Verified,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ProxyKind {
    Erc1967,
    Uups,
    Transparent,
    Beacon,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyInfo {
    pub implementation_deployment_id: String,
    pub admin_address: Option<Address>,
    pub proxy_kind: ProxyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Pending,
    Executed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub block_number: Option<u64>,
    pub timestamp: Option<u64>,
    pub tx_hash: Option<B256>,
    pub safe_tx_hash: Option<B256>,
    pub deployer_address: Address,
    pub safe_address: Option<Address>,
    pub safe_nonce: Option<u64>,
    pub status: DeploymentStatus,
}

/// The record of a single contract instance on a single chain (§3
/// "Deployment").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub address: Address,
    pub contract_name: String,
    pub label: String,
    pub namespace: String,
    pub chain_id: u64,
    pub ty: DeploymentType,
    pub salt: B256,
    pub init_code_hash: B256,
    pub constructor_args: Bytes,
    pub artifact_path: String,
    pub source_hash: Option<B256>,
    pub compiler_version: Option<String>,
    pub script_path: Option<String>,
    pub tags: BTreeSet<String>,
    pub verification_status: VerificationStatus,
    pub proxy_info: Option<ProxyInfo>,
    pub deployment_info: DeploymentInfo,
    #[serde(default)]
    pub fork: bool,
}

impl Deployment {
    /// `"<namespace>/<chain_id>/<contract_name>[:<label>]"` — unique across
    /// the whole registry.
    pub fn id(&self) -> String {
        if self.label.is_empty() {
            format!("{}/{}/{}", self.namespace, self.chain_id, self.contract_name)
        } else {
            format!("{}/{}/{}:{}", self.namespace, self.chain_id, self.contract_name, self.label)
        }
    }

    /// `"<chain_id>/<contract_name>[:<label>]"` — unique per chain+namespace.
    pub fn short_id(&self) -> String {
        if self.label.is_empty() {
            format!("{}/{}", self.chain_id, self.contract_name)
        } else {
            format!("{}/{}:{}", self.chain_id, self.contract_name, self.label)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Simulated,
    Queued,
    Executed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub chain_id: u64,
    pub sender: Address,
    pub to: Option<Address>,
    pub value: alloy_primitives::U256,
    pub calldata: Bytes,
    pub return_data: Bytes,
    pub status: TransactionStatus,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    pub tx_hash: Option<B256>,
    pub nonce: Option<u64>,
    pub safe_tx_hash: Option<B256>,
    pub deployments: Vec<String>,
}

impl Transaction {
    /// Executed transactions are keyed by hash; simulated ones by
    /// `sender × nonce × chain` since they never reach the mempool (§3).
    pub fn id(&self) -> String {
        match self.tx_hash {
            Some(hash) => format!("{hash:#x}"),
            None => format!("{}/{}/{}", self.sender, self.nonce.unwrap_or_default(), self.chain_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeBatchEntry {
    pub to: Address,
    pub value: alloy_primitives::U256,
    pub data: Bytes,
    pub operation: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub safe_tx_hash: B256,
    pub safe_address: Address,
    pub chain_id: u64,
    pub nonce: u64,
    pub batch: Vec<SafeBatchEntry>,
    pub confirmations: Vec<Address>,
    pub proposer: Address,
    pub execution_tx_hash: Option<B256>,
}

impl SafeTransaction {
    pub fn id(&self) -> String {
        format!("{:#x}", self.safe_tx_hash)
    }
}

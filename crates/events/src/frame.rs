//! The runner's wire format (§6): one JSON object per line, each either an
//! `event`, a `trace`, a `log`, or the terminal `summary`.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::Deserialize;
use treb_registry::DeploymentType;

use crate::error::{EventError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DeployingContract { transaction_id: String, contract_name: String, artifact_path: Option<String> },
    ContractDeployed {
        transaction_id: String,
        address: Address,
        contract_name: String,
        deployment_type: DeploymentType,
        #[serde(default)]
        salt: Option<B256>,
        #[serde(default)]
        constructor_args: Option<Bytes>,
        #[serde(default)]
        artifact_path: Option<String>,
    },
    TransactionSimulated { transaction_id: String, sender: Address, to: Option<Address>, value: U256, calldata: Bytes },
    BroadcastStarted { transaction_id: String },
    TransactionBroadcast {
        transaction_id: String,
        tx_hash: Option<B256>,
        #[serde(default)]
        block_number: Option<u64>,
        #[serde(default)]
        gas_used: Option<u64>,
    },
    TransactionFailed { transaction_id: String, reason: String },
    SafeTransactionQueued { transaction_id: String, safe_tx_hash: B256, safe_address: Address, nonce: u64, proposer: Address },
    Upgraded { address: Address, implementation: Address },
    AdminChanged { address: Address, previous_admin: Address, new_admin: Address },
    BeaconUpgraded { address: Address, beacon: Address },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TraceOrderItem {
    Log { log: usize },
    Call { call: usize },
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TraceNode {
    #[serde(default)]
    pub ordering: Vec<TraceOrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Summary {
    pub success: bool,
    #[serde(default)]
    pub gas_used: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum Frame {
    Event(Event),
    Trace(TraceNode),
    Log(String),
    Summary(Summary),
}

/// Shape-matches the frame against its one populated field rather than
/// relying on an internal serde tag, since the runner's envelope only ever
/// sets one of `event`/`trace`/`log`/`summary`.
#[derive(Debug, Deserialize)]
struct RawFrame {
    event: Option<Event>,
    trace: Option<TraceNode>,
    log: Option<String>,
    summary: Option<Summary>,
}

pub fn decode_frame(line: &str) -> Result<Frame> {
    let raw: RawFrame = serde_json::from_str(line)?;
    match (raw.event, raw.trace, raw.log, raw.summary) {
        (Some(event), None, None, None) => Ok(Frame::Event(event)),
        (None, Some(trace), None, None) => Ok(Frame::Trace(trace)),
        (None, None, Some(log), None) => Ok(Frame::Log(log)),
        (None, None, None, Some(summary)) => Ok(Frame::Summary(summary)),
        _ => Err(EventError::MalformedFrame(line.to_string())),
    }
}

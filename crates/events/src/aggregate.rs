//! Groups the runner's event stream into `TransactionInfo` aggregates and a
//! `ScriptExecution` (§3, §4.4). Pure in-memory aggregation — no registry or
//! indexer access happens here, that's `result::ResultParser`'s job (C8).

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use treb_registry::{DeploymentType, TransactionStatus};

use crate::frame::{Event, Frame};

#[derive(Debug, Clone)]
pub struct PendingDeployment {
    pub transaction_id: String,
    pub address: Address,
    pub contract_name: String,
    pub deployment_type: DeploymentType,
    pub artifact_path: Option<String>,
    pub salt: Option<B256>,
    pub constructor_args: Option<Bytes>,
    /// Monotonic position in the event stream; used for proxy/upgrade
    /// correlation (§4.4).
    pub seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionInfo {
    pub transaction_id: String,
    pub sender: Option<Address>,
    pub to: Option<Address>,
    pub value: U256,
    pub calldata: Bytes,
    pub status: Option<TransactionStatus>,
    pub tx_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    pub safe_tx_hash: Option<B256>,
    pub failure_reason: Option<String>,
    pub deployments: Vec<PendingDeployment>,
}

impl TransactionInfo {
    fn new(transaction_id: String) -> Self {
        Self { transaction_id, ..Default::default() }
    }

    /// §4.4 status precedence: failed > executed > queued > simulated.
    fn recompute_status(&mut self) {
        self.status = Some(if self.failure_reason.is_some() {
            TransactionStatus::Failed
        } else if self.tx_hash.is_some() {
            TransactionStatus::Executed
        } else if self.safe_tx_hash.is_some() {
            TransactionStatus::Queued
        } else {
            TransactionStatus::Simulated
        });
    }
}

#[derive(Debug, Clone)]
pub struct ProxyRelationship {
    pub implementation: Address,
    pub admin: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct SafeQueued {
    pub transaction_id: String,
    pub safe_tx_hash: B256,
    pub safe_address: Address,
    pub nonce: u64,
    pub proposer: Address,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptExecution {
    pub logs: Vec<String>,
    pub transactions: Vec<TransactionInfo>,
    pub deployments: Vec<PendingDeployment>,
    pub proxy_relationships: HashMap<Address, ProxyRelationship>,
    pub safe_queued: Vec<SafeQueued>,
    pub success: bool,
    pub gas_used: Option<u64>,
}

#[derive(Default)]
pub struct Aggregator {
    order: Vec<String>,
    transactions: HashMap<String, TransactionInfo>,
    logs: Vec<String>,
    proxy_deploy_seq: HashMap<Address, u64>,
    upgrades: Vec<(u64, Address, Address)>,
    admin_changes: Vec<(Address, Address)>,
    safe_queued: Vec<SafeQueued>,
    seq: u64,
    summary: Option<(bool, Option<u64>)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, frame: Frame) {
        match frame {
            Frame::Log(line) => self.logs.push(line),
            Frame::Trace(_) => {}
            Frame::Summary(summary) => self.summary = Some((summary.success, summary.gas_used)),
            Frame::Event(event) => self.ingest_event(event),
        }
    }

    fn entry(&mut self, transaction_id: &str) -> &mut TransactionInfo {
        if !self.transactions.contains_key(transaction_id) {
            self.order.push(transaction_id.to_string());
            self.transactions.insert(transaction_id.to_string(), TransactionInfo::new(transaction_id.to_string()));
        }
        self.transactions.get_mut(transaction_id).unwrap()
    }

    fn ingest_event(&mut self, event: Event) {
        let seq = self.seq;
        self.seq += 1;

        match event {
            Event::DeployingContract { .. } => {}
            Event::ContractDeployed { transaction_id, address, contract_name, deployment_type, salt, constructor_args, artifact_path } => {
                if deployment_type == DeploymentType::Proxy {
                    self.proxy_deploy_seq.insert(address, seq);
                }
                let tx = self.entry(&transaction_id);
                tx.deployments.push(PendingDeployment { transaction_id, address, contract_name, deployment_type, artifact_path, salt, constructor_args, seq });
            }
            Event::TransactionSimulated { transaction_id, sender, to, value, calldata } => {
                let tx = self.entry(&transaction_id);
                tx.sender = Some(sender);
                tx.to = to;
                tx.value = value;
                tx.calldata = calldata;
                tx.recompute_status();
            }
            Event::BroadcastStarted { transaction_id } => {
                self.entry(&transaction_id);
            }
            Event::TransactionBroadcast { transaction_id, tx_hash, block_number, gas_used } => {
                let tx = self.entry(&transaction_id);
                tx.tx_hash = tx_hash;
                tx.block_number = block_number;
                tx.gas_used = gas_used;
                tx.recompute_status();
            }
            Event::TransactionFailed { transaction_id, reason } => {
                let tx = self.entry(&transaction_id);
                tx.failure_reason = Some(reason);
                tx.recompute_status();
            }
            Event::SafeTransactionQueued { transaction_id, safe_tx_hash, safe_address, nonce, proposer } => {
                self.safe_queued.push(SafeQueued { transaction_id: transaction_id.clone(), safe_tx_hash, safe_address, nonce, proposer });
                let tx = self.entry(&transaction_id);
                tx.safe_tx_hash = Some(safe_tx_hash);
                tx.recompute_status();
            }
            Event::Upgraded { address, implementation } => {
                self.upgrades.push((seq, address, implementation));
            }
            Event::AdminChanged { address, new_admin, .. } => {
                self.admin_changes.push((address, new_admin));
            }
            Event::BeaconUpgraded { address, beacon } => {
                self.upgrades.push((seq, address, beacon));
            }
        }
    }

    /// Finalizes the aggregate: discards deployments belonging to failed
    /// transactions and synthesizes proxy relationships by correlating each
    /// `ContractDeployed(type=proxy)` with the nearest `Upgraded` at the same
    /// or a later sequence number for the same address (§4.4).
    pub fn finish(mut self) -> ScriptExecution {
        let mut proxy_relationships: HashMap<Address, ProxyRelationship> = HashMap::new();
        for (upgrade_seq, address, implementation) in &self.upgrades {
            if let Some(&deploy_seq) = self.proxy_deploy_seq.get(address) {
                if deploy_seq <= *upgrade_seq {
                    proxy_relationships.insert(*address, ProxyRelationship { implementation: *implementation, admin: None });
                }
            }
        }
        for (address, admin) in &self.admin_changes {
            if let Some(relationship) = proxy_relationships.get_mut(address) {
                relationship.admin = Some(*admin);
            }
        }

        let mut transactions = Vec::with_capacity(self.order.len());
        let mut deployments = Vec::new();
        for id in &self.order {
            let tx = self.transactions.remove(id).expect("order tracks every inserted id");
            if tx.status != Some(TransactionStatus::Failed) {
                deployments.extend(tx.deployments.iter().cloned());
            }
            transactions.push(tx);
        }

        let (success, gas_used) = self.summary.unwrap_or((false, None));

        ScriptExecution { logs: self.logs, transactions, deployments, proxy_relationships, safe_queued: self.safe_queued, success, gas_used }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::decode_frame;

    fn ingest_lines(lines: &[&str]) -> ScriptExecution {
        let mut aggregator = Aggregator::new();
        for line in lines {
            aggregator.ingest(decode_frame(line).unwrap());
        }
        aggregator.finish()
    }

    #[test]
    fn failed_transaction_discards_its_deployments() {
        let addr = Address::repeat_byte(1);
        let execution = ingest_lines(&[
            &format!(
                r#"{{"event":{{"type":"contract_deployed","transaction_id":"tx1","address":"{addr}","contract_name":"Foo","deployment_type":"singleton"}}}}"#
            ),
            r#"{"event":{"type":"transaction_failed","transaction_id":"tx1","reason":"reverted"}}"#,
        ]);
        assert!(execution.deployments.is_empty());
        assert_eq!(execution.transactions[0].status, Some(TransactionStatus::Failed));
    }

    #[test]
    fn status_precedes_executed_over_simulated() {
        let execution = ingest_lines(&[
            r#"{"event":{"type":"transaction_simulated","transaction_id":"tx1","sender":"0x0000000000000000000000000000000000000001","to":null,"value":"0","calldata":"0x"}}"#,
            r#"{"event":{"type":"transaction_broadcast","transaction_id":"tx1","tx_hash":"0x0000000000000000000000000000000000000000000000000000000000000001"}}"#,
        ]);
        assert_eq!(execution.transactions[0].status, Some(TransactionStatus::Executed));
    }

    #[test]
    fn proxy_upgrade_correlation_same_address() {
        let addr = Address::repeat_byte(2);
        let implementation = Address::repeat_byte(3);
        let execution = ingest_lines(&[
            &format!(
                r#"{{"event":{{"type":"contract_deployed","transaction_id":"tx1","address":"{addr}","contract_name":"Proxy","deployment_type":"proxy"}}}}"#
            ),
            &format!(r#"{{"event":{{"type":"upgraded","address":"{addr}","implementation":"{implementation}"}}}}"#),
        ]);
        let relationship = execution.proxy_relationships.get(&addr).expect("relationship synthesized");
        assert_eq!(relationship.implementation, implementation);
    }

    #[test]
    fn safe_queued_status_is_queued() {
        let safe = Address::repeat_byte(4);
        let proposer = Address::repeat_byte(5);
        let execution = ingest_lines(&[&format!(
            r#"{{"event":{{"type":"safe_transaction_queued","transaction_id":"tx1","safe_tx_hash":"0x0000000000000000000000000000000000000000000000000000000000000009","safe_address":"{safe}","nonce":1,"proposer":"{proposer}"}}}}"#
        )]);
        assert_eq!(execution.transactions[0].status, Some(TransactionStatus::Queued));
    }
}

//! Capability seams for the two remaining external collaborators the core
//! never designs (§1): block-explorer verification back-ends and the
//! RPC trace fetch `register` needs for a mined transaction. Both are
//! "driven by opaque commands" per spec, so the concrete shape here is a
//! shell-out, matching `treb_common::vcs::GitVcs`'s own idiom.

use std::path::Path;
use std::process::Command;

use treb_registry::{Deployment, VerificationStatus};

/// Shells out to the toolchain's own build command (§1: compilation is an
/// external collaborator, "the EVM scripting language and compiler").
pub struct ShellBuilder {
    pub binary: String,
}

impl treb_indexer::Builder for ShellBuilder {
    fn compile(&self, root: &Path) -> eyre::Result<()> {
        let status = Command::new(&self.binary).arg("build").current_dir(root).status()?;
        if !status.success() {
            eyre::bail!("{} build failed with {status}", self.binary);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierBackend {
    Etherscan,
    Blockscout,
    Sourcify,
}

impl VerifierBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Etherscan => "etherscan",
            Self::Blockscout => "blockscout",
            Self::Sourcify => "sourcify",
        }
    }
}

pub trait Verifier: Send + Sync {
    fn verify(&self, backend: VerifierBackend, deployment: &Deployment) -> eyre::Result<VerificationStatus>;
}

/// Shells out to the toolchain's own verify subcommand, e.g.
/// `forge verify-contract --verifier etherscan <address> <artifact>`.
pub struct ShellVerifier {
    pub binary: String,
}

impl Verifier for ShellVerifier {
    fn verify(&self, backend: VerifierBackend, deployment: &Deployment) -> eyre::Result<VerificationStatus> {
        let status = Command::new(&self.binary)
            .arg("verify-contract")
            .arg("--verifier")
            .arg(backend.as_str())
            .arg(treb_common::address_hex(&deployment.address))
            .arg(&deployment.artifact_path)
            .status()?;

        Ok(if status.success() { VerificationStatus::Verified } else { VerificationStatus::Failed })
    }
}

/// One contract-creation hit inside a mined transaction's trace, the unit
/// `register` labels interactively (§6 `register`).
#[derive(Debug, Clone)]
pub struct TraceCreation {
    pub address: alloy_primitives::Address,
    pub init_code: Vec<u8>,
}

pub trait TxTracer: Send + Sync {
    fn trace(&self, tx_hash: &str) -> eyre::Result<Vec<TraceCreation>>;
}

/// No RPC client is wired into this workspace (Non-goal: "talk directly to
/// RPC nodes" belongs to the runner alone); `register` surfaces a clear
/// error until a concrete `TxTracer` is injected.
pub struct NoopTxTracer;

impl TxTracer for NoopTxTracer {
    fn trace(&self, tx_hash: &str) -> eyre::Result<Vec<TraceCreation>> {
        eyre::bail!("no transaction tracer configured; cannot fetch the trace for {tx_hash}")
    }
}

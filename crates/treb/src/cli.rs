//! CLI argument surface (§6). Parsing itself is an external-collaborator
//! concern per `spec.md` §1 ("CLI argument parsing" is out of scope for the
//! core); this binary is where that collaborator actually lives.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "treb", version, about = "Deterministic, registry-tracked smart-contract deployments")]
pub struct Cli {
    /// Project root; defaults to the current directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Disables interactive prompts and color, same effect as `TREB_NON_INTERACTIVE=1`.
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DeploymentTypeArg {
    Singleton,
    Proxy,
    Library,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a deployment script.
    Run {
        script: String,
        #[arg(long)]
        network: String,
        #[arg(long)]
        namespace: String,
        /// `KEY=VALUE`, repeatable.
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        debug: bool,
        #[arg(long)]
        debug_json: bool,
    },

    /// List known deployments.
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        contract: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long = "type", value_enum)]
        ty: Option<DeploymentTypeArg>,
        #[arg(long)]
        fork: bool,
        #[arg(long)]
        no_fork: bool,
        #[arg(long)]
        json: bool,
    },

    /// Show one deployment.
    Show {
        reference: String,
        #[arg(long)]
        no_fork: bool,
    },

    /// Submit verification requests for a deployment (or `--all`).
    Verify {
        reference: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        contract_path: Option<String>,
        #[arg(short = 'e', long)]
        etherscan: bool,
        #[arg(short = 'b', long)]
        blockscout: bool,
        #[arg(short = 's', long)]
        sourcify: bool,
        #[arg(long)]
        blockscout_verifier_url: Option<String>,
    },

    /// Show or edit a deployment's tags.
    Tag {
        reference: String,
        #[arg(long)]
        add: Option<String>,
        #[arg(long)]
        remove: Option<String>,
    },

    /// Register a deployment from a mined transaction.
    Register {
        #[arg(long = "tx-hash")]
        tx_hash: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long = "contract")]
        contract_path: Option<String>,
        #[arg(long = "contract-name")]
        contract_name: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        skip_verify: bool,
    },

    /// Delete every entry for the current namespace x chain.
    Reset {
        #[arg(long)]
        namespace: String,
        #[arg(long)]
        chain: u64,
    },

    /// List configured RPC endpoints with chain IDs.
    Networks,

    /// Manage `.treb/config.local.json`.
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Scaffold `.treb/` and required project config.
    Init,

    /// Rewrite legacy sender config into a dedicated `treb.toml`.
    Migrate {
        #[arg(long)]
        prune_empty: bool,
        #[arg(long)]
        rewrite_toolchain_config: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    Set { key: String, value: String },
    Remove { key: String },
}

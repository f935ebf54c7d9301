//! C11 — wires every other component into the single synchronous pipeline
//! the `treb` binary's `run` subcommand calls (§4.11).

pub mod error;
pub mod meta_resolver;
pub mod orchestrator;

pub use error::{OrchestratorError, Result};
pub use meta_resolver::RegistryMetaResolver;
pub use orchestrator::{Orchestrator, RunReport, RunRequest};

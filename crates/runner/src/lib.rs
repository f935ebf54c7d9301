//! Wraps the external forge-compatible script runner as a subprocess,
//! decoding its stdout frame stream for the rest of the pipeline.

pub mod cancel;
pub mod error;
pub mod invocation;
pub mod runner;

pub use cancel::CancelToken;
pub use error::{Result, RunnerError};
pub use invocation::Invocation;
pub use runner::{RunOutcome, Runner};

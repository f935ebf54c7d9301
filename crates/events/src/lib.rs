//! C4 (frame decoding + aggregation) and C8 (result parsing into a
//! changeset) share this crate: both operate on the same event/frame stream
//! the runner produces for one script invocation.

pub mod aggregate;
pub mod error;
pub mod frame;
pub mod result;

pub use aggregate::{Aggregator, PendingDeployment, ProxyRelationship, SafeQueued, ScriptExecution, TransactionInfo};
pub use error::{EventError, Result};
pub use frame::{decode_frame, Event, Frame, Summary, TraceNode, TraceOrderItem};
pub use result::ResultParser;

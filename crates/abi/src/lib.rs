//! C3 — ABI registry and selector-based call decoding.
//!
//! Read-only with respect to the registry/runner: nothing here mutates
//! on-disk state, it only maintains in-memory `address → ABI` knowledge for
//! display and for the result parser (C4/C8).

pub mod decode;
pub mod error;
pub mod registry;

pub use decode::{format_value, DecodedCall};
pub use error::{AbiError, Result};
pub use registry::{AbiRegistry, AbiResolver, NoopResolver, ResolvedAbi};
